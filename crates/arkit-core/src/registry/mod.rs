//! Selection and lifecycle of the process-wide resolver.
//!
//! # Design
//!
//! Resolver implementations are discovered through the [`PluginRegistry`]
//! port. [`ResolverRegistry`] picks exactly one of them, constructs it on
//! first use and hands out the same instance forever after.
//!
//! Selection is deterministic:
//!
//! 1. If a preferred type name was set, that implementation is chosen. A
//!    preferred name that is not registered is a configuration error.
//! 2. Otherwise candidates are sorted by type name and the first wins.
//!
//! Once the resolver exists the choice is frozen: later calls to
//! [`ResolverRegistry::set_preferred_resolver`] are ignored.

mod plugins;

use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, OnceLock, PoisonError, RwLock};

use crate::config::ResolverConfig;
use crate::error::RegistryError;
use crate::resolver::Resolver;

pub use plugins::{PluginRegistry, ResolverDescriptor, ResolverFactory, StaticPluginRegistry};

#[cfg(test)]
pub use plugins::MockPluginRegistry;

/// Tracing target for resolver selection and construction.
pub const INIT_TARGET: &str = "arkit::resolver_init";

/// Owns the choice and the single instance of the resolver.
pub struct ResolverRegistry {
    plugins: Arc<dyn PluginRegistry>,
    preferred: RwLock<Option<String>>,
    resolver: OnceLock<Arc<dyn Resolver>>,
    init_lock: Mutex<()>,
}

impl ResolverRegistry {
    pub fn new(plugins: Arc<dyn PluginRegistry>) -> Self {
        Self {
            plugins,
            preferred: RwLock::new(None),
            resolver: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Registry over `plugins` configured from `config`.
    pub fn with_config(plugins: Arc<dyn PluginRegistry>, config: &ResolverConfig) -> Self {
        let registry = Self::new(plugins);
        if let Some(name) = &config.preferred_resolver {
            registry.set_preferred_resolver(name);
        }
        registry
    }

    /// The resolver instance, constructing it on first call.
    ///
    /// Exactly one thread constructs; concurrent callers wait and receive
    /// the same instance. A failed construction is not remembered, so a
    /// later call tries again.
    pub fn get_resolver(&self) -> Result<Arc<dyn Resolver>, RegistryError> {
        if let Some(resolver) = self.resolver.get() {
            return Ok(Arc::clone(resolver));
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resolver) = self.resolver.get() {
            return Ok(Arc::clone(resolver));
        }

        let resolver = self.construct()?;
        Ok(Arc::clone(self.resolver.get_or_init(|| resolver)))
    }

    /// Choose the implementation to construct by type name.
    ///
    /// Returns `false`, leaving the instance untouched, if the resolver has
    /// already been constructed.
    pub fn set_preferred_resolver(&self, type_name: &str) -> bool {
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.resolver.get().is_some() {
            tracing::warn!(
                target: INIT_TARGET,
                requested = type_name,
                "Resolver already constructed; ignoring preferred resolver"
            );
            return false;
        }
        *self.preferred.write().unwrap_or_else(PoisonError::into_inner) = Some(type_name.to_string());
        true
    }

    pub fn preferred_resolver(&self) -> Option<String> {
        self.preferred
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registered implementations in selection order. Nothing is constructed.
    pub fn available_resolvers(&self) -> Vec<ResolverDescriptor> {
        let mut candidates = self.plugins.available_resolvers();
        candidates.sort();
        candidates
    }

    pub fn is_initialized(&self) -> bool {
        self.resolver.get().is_some()
    }

    fn construct(&self) -> Result<Arc<dyn Resolver>, RegistryError> {
        let candidates = self.available_resolvers();
        let names: Vec<String> = candidates.iter().map(|c| c.type_name.clone()).collect();
        tracing::debug!(target: INIT_TARGET, candidates = ?names, "Selecting resolver");

        let preferred = self.preferred_resolver();
        let (chosen, reason) = match &preferred {
            Some(name) => {
                let found = candidates.iter().find(|c| &c.type_name == name);
                let Some(found) = found else {
                    tracing::error!(target: INIT_TARGET, preferred = %name, "Preferred resolver not registered");
                    return Err(RegistryError::PreferredNotFound {
                        name: name.clone(),
                        available: names,
                    });
                };
                (found, "preferred")
            }
            None => {
                let Some(first) = candidates.first() else {
                    return Err(RegistryError::NoResolvers);
                };
                (first, "first registered")
            }
        };

        tracing::info!(
            target: INIT_TARGET,
            resolver = %chosen.type_name,
            reason,
            "Using asset resolver"
        );
        self.plugins
            .instantiate(chosen)
            .map_err(|e| RegistryError::Instantiate {
                type_name: chosen.type_name.clone(),
                reason: format!("{e:#}"),
            })
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("preferred", &self.preferred_resolver())
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

/// Global plugin registry instance
static PLUGINS: LazyLock<Arc<StaticPluginRegistry>> =
    LazyLock::new(|| Arc::new(StaticPluginRegistry::with_builtin()));

/// Global resolver registry instance
static REGISTRY: LazyLock<ResolverRegistry> = LazyLock::new(|| {
    ResolverRegistry::with_config(
        Arc::clone(&*PLUGINS) as Arc<dyn PluginRegistry>,
        &ResolverConfig::from_env(),
    )
});

/// Make a resolver implementation available to the process-wide registry.
///
/// Registration after the resolver has been constructed has no effect on
/// which implementation is in use.
pub fn register_resolver(
    type_name: impl Into<String>,
    description: impl Into<String>,
    factory: ResolverFactory,
) {
    PLUGINS.register(type_name, description, factory);
}

/// Get the process-wide resolver registry.
pub fn registry() -> &'static ResolverRegistry {
    &REGISTRY
}

/// The process-wide resolver.
///
/// # Panics
///
/// Panics if no resolver can be constructed. That is a configuration error
/// (for example an unregistered preferred resolver) with no sensible
/// fallback; use [`try_get_resolver`] to handle it instead.
pub fn get_resolver() -> Arc<dyn Resolver> {
    match REGISTRY.get_resolver() {
        Ok(resolver) => resolver,
        Err(e) => panic!("Cannot construct asset resolver: {e}"),
    }
}

/// The process-wide resolver, or the reason it cannot be constructed.
pub fn try_get_resolver() -> Result<Arc<dyn Resolver>, RegistryError> {
    REGISTRY.get_resolver()
}

/// Choose the process-wide resolver implementation.
///
/// Only effective before the first [`get_resolver`] call.
pub fn set_preferred_resolver(type_name: &str) -> bool {
    REGISTRY.set_preferred_resolver(type_name)
}

/// Registered resolver implementations, in selection order.
pub fn get_available_resolvers() -> Vec<ResolverDescriptor> {
    REGISTRY.available_resolvers()
}
