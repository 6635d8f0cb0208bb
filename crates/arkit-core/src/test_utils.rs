//! Test utilities for tests that touch process-wide state.
//!
//! Environment variables, the global default search path and the global
//! registry are shared by every test in the binary. Tests that read or
//! write them serialize through [`GLOBAL_LOCK`].

use std::env;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing_subscriber::EnvFilter;

/// Shared lock to serialize tests that depend on process-wide state.
///
/// Hold it while touching `ARKIT_*` variables, calling
/// [`DefaultResolver::set_default_search_path`](crate::DefaultResolver::set_default_search_path)
/// or constructing the process-wide resolver.
pub static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

/// Acquire [`GLOBAL_LOCK`], ignoring poisoning from a failed test.
pub fn lock_globals() -> MutexGuard<'static, ()> {
    GLOBAL_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Sets or clears an environment variable, putting the old value back on drop.
///
/// # Example
///
/// ```ignore
/// let _lock = lock_globals();
/// let _preferred = EnvVarGuard::set(PREFERRED_RESOLVER_ENV, "StudioResolver");
/// let _search = EnvVarGuard::unset(DEFAULT_SEARCH_PATH_ENV);
/// assert_eq!(
///     ResolverConfig::from_env().preferred_resolver.as_deref(),
///     Some("StudioResolver")
/// );
/// // Both variables are restored when the guards drop.
/// ```
pub struct EnvVarGuard {
    key: &'static str,
    saved: Option<String>,
}

impl EnvVarGuard {
    pub fn set(key: &'static str, value: &str) -> Self {
        Self::replace(key, Some(value))
    }

    pub fn unset(key: &'static str) -> Self {
        Self::replace(key, None)
    }

    #[allow(unsafe_code)]
    fn replace(key: &'static str, value: Option<&str>) -> Self {
        let saved = env::var(key).ok();
        // SAFETY: callers hold GLOBAL_LOCK, so no other test thread reads the environment.
        unsafe {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
        Self { key, saved }
    }
}

impl Drop for EnvVarGuard {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        // SAFETY: as in `replace`.
        unsafe {
            match self.saved.take() {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }
}
