//! Path utilities for asset identifiers.
//!
//! Everything here is pure string manipulation except [`absolute_path`]
//! (reads the working directory) and [`exists`] (one filesystem lookup).
//!
//! # Classification
//!
//! - absolute: `/a/b.txt` (or `C:/a/b.txt` on Windows)
//! - file-relative: starts with `./` or `../`, anchored, never searched
//! - search-relative: any other non-empty relative path
//!
//! Package-relative paths (`a.pack[b.usd]`) are handled in their own
//! module; see [`is_package_relative_path`].

mod classify;
mod list;
mod normalize;
mod package;

pub use classify::{
    anchor_relative_path, anchor_directory, is_file_relative, is_relative, is_search_relative,
};
pub use list::{PATH_LIST_SEPARATOR, join_path_list, split_path_list};
pub use normalize::{absolute_path, exists, join_paths, normalize_path, parent_directory};
pub use package::{
    is_package_relative_path, join_package_relative_path, split_package_relative_path_inner,
    split_package_relative_path_outer,
};
