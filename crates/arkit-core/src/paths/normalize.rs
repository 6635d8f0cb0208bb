//! Lexical path normalization.

use std::env;
use std::path::Path;

use crate::error::ContextError;

/// Separator used in normalized output.
const SEP: char = '/';

/// Split off a Windows drive prefix (`C:`), keeping its original case.
#[cfg(windows)]
fn split_prefix(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        path.split_at(2)
    } else {
        ("", path)
    }
}

#[cfg(not(windows))]
const fn split_prefix(path: &str) -> (&str, &str) {
    ("", path)
}

/// Normalize a path lexically.
///
/// Collapses repeated separators, removes `.` components and folds `..`
/// into its parent where one exists. Leading `..` components of a
/// relative path are kept; `..` above the root of an absolute path is
/// dropped. Backslashes are treated as separators on Windows only. The
/// empty string normalizes to itself; a path that folds away completely
/// becomes `.`.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    #[cfg(windows)]
    let owned = path.replace('\\', "/");
    #[cfg(windows)]
    let path = owned.as_str();

    let (prefix, rest) = split_prefix(path);
    let rooted = rest.starts_with(SEP);

    let mut parts: Vec<&str> = Vec::new();
    for component in rest.split(SEP) {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("{prefix}/{body}"),
        (false, true) if prefix.is_empty() => ".".to_string(),
        (false, _) => format!("{prefix}{body}"),
    }
}

/// Join two path strings with a single separator.
pub fn join_paths(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    if base.ends_with(SEP) || (cfg!(windows) && base.ends_with('\\')) {
        format!("{base}{path}")
    } else {
        format!("{base}{SEP}{path}")
    }
}

/// Absolutize `path` against the current working directory, then normalize.
pub fn absolute_path(path: &str) -> Result<String, ContextError> {
    if path.is_empty() {
        return Ok(String::new());
    }
    if Path::new(path).is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = env::current_dir().map_err(|e| ContextError::CurrentDir(e.to_string()))?;
    Ok(normalize_path(&join_paths(&cwd.to_string_lossy(), path)))
}

/// Directory component of a normalized path.
///
/// `/a/b.txt` gives `/a`, `/b.txt` gives `/`, `b.txt` gives the empty string.
pub fn parent_directory(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rfind(SEP) {
        Some(0) => "/".to_string(),
        Some(idx) => {
            let dir = &normalized[..idx];
            // Keep the root of a drive-letter path (`C:` -> `C:/`).
            if dir.ends_with(':') {
                format!("{dir}/")
            } else {
                dir.to_string()
            }
        }
        None => String::new(),
    }
}

/// Whether anything exists at `path`.
pub fn exists(path: &str) -> bool {
    !path.is_empty() && Path::new(path).exists()
}
