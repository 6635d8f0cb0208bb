//! Context object understood by [`DefaultResolver`](crate::DefaultResolver).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ContextError;
use crate::paths::absolute_path;

/// Ordered list of absolute directories searched for search-relative paths.
///
/// Entries are absolutized against the current working directory when the
/// context is built, normalized, and de-duplicated keeping the first
/// occurrence. Empty entries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefaultResolverContext {
    search_path: Vec<String>,
}

impl DefaultResolverContext {
    /// Build a context, skipping (with a warning) entries that cannot be
    /// absolutized.
    pub fn new<I, S>(search_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::default();
        for entry in search_path {
            let entry = entry.as_ref();
            match absolute_path(entry) {
                Ok(abs) => context.push_unique(abs),
                Err(e) => {
                    tracing::warn!(
                        entry,
                        error = %e,
                        "Could not determine absolute path for search path entry"
                    );
                }
            }
        }
        context
    }

    /// Build a context, failing on the first entry that cannot be absolutized.
    pub fn try_new<I, S>(search_path: I) -> Result<Self, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::default();
        for entry in search_path {
            context.push_unique(absolute_path(entry.as_ref())?);
        }
        Ok(context)
    }

    fn push_unique(&mut self, abs: String) {
        if !abs.is_empty() && !self.search_path.contains(&abs) {
            self.search_path.push(abs);
        }
    }

    pub fn search_path(&self) -> &[String] {
        &self.search_path
    }

    pub fn is_empty(&self) -> bool {
        self.search_path.is_empty()
    }
}

impl fmt::Display for DefaultResolverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.search_path.is_empty() {
            return f.write_str("Search path: [ ]");
        }
        write!(f, "Search path: [\n    {}\n]", self.search_path.join("\n    "))
    }
}
