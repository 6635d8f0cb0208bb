//! Common test utilities.
//!
//! Filesystem fixtures and a lock for tests that touch the process-wide
//! resolver state (default search path, registry, environment).

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use arkit_core::paths::{join_paths, normalize_path};
use tempfile::TempDir;

static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that read or write process-wide resolver state.
pub fn lock_globals() -> MutexGuard<'static, ()> {
    GLOBAL_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A temporary directory tree of empty asset files.
pub struct AssetTree {
    dir: TempDir,
}

impl AssetTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Normalized absolute path of the tree root.
    pub fn root(&self) -> String {
        normalize_path(&self.dir.path().to_string_lossy())
    }

    /// Normalized absolute path of `rel` inside the tree, whether or not it exists.
    pub fn path(&self, rel: &str) -> String {
        normalize_path(&join_paths(&self.root(), rel))
    }

    /// Create an empty file at `rel`, with parent directories, and return its path.
    pub fn touch(&self, rel: &str) -> String {
        let path = self.path(rel);
        if let Some(parent) = Path::new(&path).parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, b"").expect("failed to write asset");
        path
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path(rel)).expect("failed to remove asset");
    }
}

/// Restores the process-wide default search path on drop.
pub struct SearchPathGuard {
    previous: Vec<String>,
}

impl SearchPathGuard {
    pub fn set<S: AsRef<str>>(paths: &[S]) -> Self {
        let previous = arkit_core::DefaultResolver::default_search_path();
        arkit_core::DefaultResolver::set_default_search_path(paths);
        Self { previous }
    }
}

impl Drop for SearchPathGuard {
    fn drop(&mut self) {
        arkit_core::DefaultResolver::set_default_search_path(&self.previous);
    }
}
