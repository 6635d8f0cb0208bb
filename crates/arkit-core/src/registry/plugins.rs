//! Plugin port: where resolver implementations come from.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::default_resolver::{DEFAULT_RESOLVER_TYPE_NAME, DefaultResolver};
use crate::resolver::Resolver;

/// A registered resolver implementation.
///
/// Ordering is by type name, then description, which is the order
/// candidates are considered in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResolverDescriptor {
    pub type_name: String,
    pub description: String,
}

impl ResolverDescriptor {
    pub fn new(type_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            description: description.into(),
        }
    }
}

/// Source of resolver implementations.
///
/// # Implementations
///
/// - `StaticPluginRegistry` - factories registered in-process
/// - Hosts with dynamic plugin loading provide their own
#[cfg_attr(test, mockall::automock)]
pub trait PluginRegistry: Send + Sync {
    /// Every implementation that could be constructed.
    fn available_resolvers(&self) -> Vec<ResolverDescriptor>;

    /// Construct the implementation described by `descriptor`.
    fn instantiate(&self, descriptor: &ResolverDescriptor) -> anyhow::Result<Arc<dyn Resolver>>;
}

/// Constructor for a resolver implementation.
pub type ResolverFactory = Arc<dyn Fn() -> anyhow::Result<Arc<dyn Resolver>> + Send + Sync>;

/// In-process plugin registry keyed by type name.
#[derive(Default)]
pub struct StaticPluginRegistry {
    factories: RwLock<BTreeMap<String, (ResolverDescriptor, ResolverFactory)>>,
}

impl StaticPluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding [`DefaultResolver`].
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(
            DEFAULT_RESOLVER_TYPE_NAME,
            "Filesystem resolver with search paths",
            Arc::new(|| Ok(Arc::new(DefaultResolver::new()) as Arc<dyn Resolver>)),
        );
        registry
    }

    /// Register `factory` under `type_name`, replacing any previous entry.
    pub fn register(
        &self,
        type_name: impl Into<String>,
        description: impl Into<String>,
        factory: ResolverFactory,
    ) {
        let descriptor = ResolverDescriptor::new(type_name, description);
        tracing::debug!(resolver = %descriptor.type_name, "Registered resolver implementation");
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(descriptor.type_name.clone(), (descriptor, factory));
    }
}

impl PluginRegistry for StaticPluginRegistry {
    fn available_resolvers(&self) -> Vec<ResolverDescriptor> {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|(descriptor, _)| descriptor.clone())
            .collect()
    }

    fn instantiate(&self, descriptor: &ResolverDescriptor) -> anyhow::Result<Arc<dyn Resolver>> {
        let factory = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&descriptor.type_name)
            .map(|(_, factory)| Arc::clone(factory));
        match factory {
            Some(factory) => factory(),
            None => anyhow::bail!("resolver '{}' is not registered", descriptor.type_name),
        }
    }
}

impl fmt::Debug for StaticPluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.available_resolvers()).finish()
    }
}
