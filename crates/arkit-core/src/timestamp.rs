//! Modification time of a resolved asset.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last-modified time of an asset, or invalid when it is unknown.
///
/// Invalid timestamps compare equal to each other and order before every
/// valid one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(Option<DateTime<Utc>>);

impl Timestamp {
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self(Some(time))
    }

    pub const fn invalid() -> Self {
        Self(None)
    }

    pub const fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    pub const fn time(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    /// Modification time of the file at `path`, invalid on any I/O error.
    pub fn of_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(modified) => Self::new(DateTime::<Utc>::from(modified)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No modification time");
                Self::invalid()
            }
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(time: DateTime<Utc>) -> Self {
        Self::new(time)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(time) => write!(f, "{}", time.to_rfc3339()),
            None => f.write_str("<invalid>"),
        }
    }
}
