//! Environment-derived resolver configuration.
//!
//! Environment variables are the only configuration surface. They are read
//! once, when the process-wide registry and default search path are first
//! used.

use std::env;

use serde::{Deserialize, Serialize};

use crate::paths::split_path_list;

/// Environment variable holding the initial default search path, as an OS
/// path list (`:`-separated on Unix, `;`-separated on Windows).
pub const DEFAULT_SEARCH_PATH_ENV: &str = "ARKIT_DEFAULT_SEARCH_PATH";

/// Environment variable naming the preferred resolver implementation.
pub const PREFERRED_RESOLVER_ENV: &str = "ARKIT_PREFERRED_RESOLVER";

/// Resolver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Initial default search path, in search order.
    pub default_search_path: Vec<String>,

    /// Type name of the resolver to construct, when more than one is registered.
    pub preferred_resolver: Option<String>,
}

impl ResolverConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_search_path = lookup(DEFAULT_SEARCH_PATH_ENV)
            .map(|list| split_path_list(&list))
            .unwrap_or_default();

        let preferred_resolver = lookup(PREFERRED_RESOLVER_ENV)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Self {
            default_search_path,
            preferred_resolver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::join_path_list;
    use crate::test_utils::{EnvVarGuard, lock_globals};
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ResolverConfig::from_env_with(|_| None);
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn search_path_splits_on_list_separator() {
        let list = join_path_list(&["/one", "", "/two"]);
        let config = ResolverConfig::from_env_with(lookup_from(&[(DEFAULT_SEARCH_PATH_ENV, &list)]));
        assert_eq!(config.default_search_path, vec!["/one", "/two"]);
    }

    #[test]
    fn blank_preferred_resolver_is_unset() {
        let config = ResolverConfig::from_env_with(lookup_from(&[(PREFERRED_RESOLVER_ENV, "  ")]));
        assert_eq!(config.preferred_resolver, None);

        let config =
            ResolverConfig::from_env_with(lookup_from(&[(PREFERRED_RESOLVER_ENV, " MyResolver ")]));
        assert_eq!(config.preferred_resolver.as_deref(), Some("MyResolver"));
    }

    #[test]
    fn from_env_reads_process_environment() {
        let _lock = lock_globals();
        let _env = EnvVarGuard::set(PREFERRED_RESOLVER_ENV, "EnvResolver");
        let _search = EnvVarGuard::unset(DEFAULT_SEARCH_PATH_ENV);
        let config = ResolverConfig::from_env();
        assert_eq!(config.preferred_resolver.as_deref(), Some("EnvResolver"));
        assert!(config.default_search_path.is_empty());
    }

    #[test]
    fn env_guards_restore_previous_values() {
        let _lock = lock_globals();
        let _outer = EnvVarGuard::set(PREFERRED_RESOLVER_ENV, "Outer");
        {
            let _inner = EnvVarGuard::unset(PREFERRED_RESOLVER_ENV);
            assert!(std::env::var(PREFERRED_RESOLVER_ENV).is_err());
        }
        assert_eq!(std::env::var(PREFERRED_RESOLVER_ENV).as_deref(), Ok("Outer"));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"preferred_resolver":"DefaultResolver"}"#).unwrap();
        assert!(config.default_search_path.is_empty());
        assert_eq!(config.preferred_resolver.as_deref(), Some("DefaultResolver"));
    }
}
