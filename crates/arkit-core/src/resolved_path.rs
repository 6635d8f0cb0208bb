//! The result of resolving an asset identifier.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::paths::normalize_path;

/// Absolute, normalized location of an asset, or empty when unresolved.
///
/// Equality and hashing use the normalized string. On Windows the
/// comparison additionally ignores case and separator style, matching
/// the filesystem's own rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedPath(String);

impl ResolvedPath {
    /// Wrap a path, normalizing it.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(normalize_path(path.as_ref()))
    }

    /// The "could not resolve" value.
    pub const fn empty() -> Self {
        Self(String::new())
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// `None` for the empty path.
    pub fn as_option(&self) -> Option<&str> {
        if self.is_empty() { None } else { Some(&self.0) }
    }

    #[cfg(windows)]
    fn comparison_key(&self) -> String {
        self.0.replace('\\', "/").to_lowercase()
    }

    #[cfg(not(windows))]
    fn comparison_key(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ResolvedPath {
    fn eq(&self, other: &Self) -> bool {
        self.comparison_key() == other.comparison_key()
    }
}

impl Eq for ResolvedPath {}

impl Hash for ResolvedPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.comparison_key().hash(state);
    }
}

impl PartialEq<str> for ResolvedPath {
    fn eq(&self, other: &str) -> bool {
        *self == Self::new(other)
    }
}

impl PartialEq<&str> for ResolvedPath {
    fn eq(&self, other: &&str) -> bool {
        *self == Self::new(other)
    }
}

impl From<String> for ResolvedPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&str> for ResolvedPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for ResolvedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty_means_unresolved() {
        assert!(ResolvedPath::empty().is_empty());
        assert!(ResolvedPath::default().is_empty());
        assert_eq!(ResolvedPath::empty().as_option(), None);
        assert!(!ResolvedPath::new("/a.txt").is_empty());
    }

    #[test]
    fn equality_uses_normalized_value() {
        let a = ResolvedPath::new("/dir/./sub//a.txt");
        let b = ResolvedPath::new("/dir/sub/a.txt");
        assert_eq!(a, b);
        assert_eq!(a, "/dir/sub/x/../a.txt");
        assert_eq!(a.as_str(), "/dir/sub/a.txt");

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serializes_as_plain_string() {
        let path = ResolvedPath::new("/a/b.txt");
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"/a/b.txt\"");
        let back: ResolvedPath = serde_json::from_str("\"/a/b.txt\"").unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn display_is_raw_path() {
        assert_eq!(ResolvedPath::new("/a/b.txt").to_string(), "/a/b.txt");
        assert_eq!(ResolvedPath::empty().to_string(), "");
    }
}
