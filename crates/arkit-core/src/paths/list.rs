//! OS path-list strings (`PATH`-style).

/// Separator between entries of a path list.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';

/// Separator between entries of a path list.
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Split a path list into its non-empty entries, in order.
pub fn split_path_list(list: &str) -> Vec<String> {
    list.split(PATH_LIST_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`split_path_list`].
pub fn join_path_list<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&PATH_LIST_SEPARATOR.to_string())
}
