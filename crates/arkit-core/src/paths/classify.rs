//! Asset path classification and anchoring.

use std::path::Path;

use super::normalize::{join_paths, normalize_path, parent_directory};

/// Non-empty and not absolute.
pub fn is_relative(path: &str) -> bool {
    !path.is_empty() && !Path::new(path).is_absolute()
}

/// Relative path starting with a same- or parent-directory marker.
pub fn is_file_relative(path: &str) -> bool {
    path.starts_with("./") || path.starts_with("../")
}

/// Relative path that is resolved by scanning search directories.
pub fn is_search_relative(path: &str) -> bool {
    is_relative(path) && !is_file_relative(path)
}

/// Directory an anchor designates.
///
/// An anchor ending in a separator already names a directory; anything
/// else is treated as a file and its last component is stripped.
pub fn anchor_directory(anchor: &str) -> String {
    let forward = if cfg!(windows) {
        anchor.replace('\\', "/")
    } else {
        anchor.to_string()
    };
    if forward.ends_with('/') {
        normalize_path(&forward)
    } else {
        parent_directory(&forward)
    }
}

/// Anchor a relative `path` to the directory of an absolute `anchor`.
///
/// Returns `path` untouched when the anchor is itself relative (or empty)
/// or when `path` is not relative.
pub fn anchor_relative_path(anchor: &str, path: &str) -> String {
    if !Path::new(anchor).is_absolute() || !is_relative(path) {
        return path.to_string();
    }
    normalize_path(&join_paths(&anchor_directory(anchor), path))
}
