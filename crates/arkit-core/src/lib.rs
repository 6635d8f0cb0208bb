//! Pluggable asset-path resolution.
//!
//! Client code names assets with logical paths and asks the process-wide
//! [`Resolver`] to turn them into identifiers and locations. Which resolver
//! that is, and how it interprets paths, is chosen by the host at startup.
//!
//! - [`get_resolver`] returns the single resolver instance.
//! - [`ResolverContextBinder`] binds a [`ResolverContext`] on the current
//!   thread, parameterizing resolution for its lifetime.
//! - [`ResolverScopedCache`] memoizes resolution results for its lifetime.
//! - [`DefaultResolver`] is the filesystem implementation, with search
//!   paths supplied by [`DefaultResolverContext`] and the process-wide
//!   default search path.

#![deny(unused_crate_dependencies)]

pub mod asset_info;
pub mod binder;
pub mod cache;
pub mod config;
pub mod context;
pub mod default_resolver;
pub mod error;
pub mod notice;
pub mod paths;
pub mod registry;
pub mod resolved_path;
pub mod resolver;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod test_utils;

pub use asset_info::AssetInfo;
pub use binder::{ResolverContextBinder, current_context};
pub use cache::{CacheScopeData, ResolverScopedCache};
pub use config::{DEFAULT_SEARCH_PATH_ENV, PREFERRED_RESOLVER_ENV, ResolverConfig};
pub use context::{ContextObject, DefaultResolverContext, ResolverContext};
pub use default_resolver::{DEFAULT_RESOLVER_TYPE_NAME, DefaultResolver, DefaultSearchPath};
pub use error::{ContextError, RegistryError, StackError};
pub use notice::{
    LocalNoticeBus, NoticeBus, NoticeHandler, ResolverChanged, Subscription, notice_bus,
};
pub use registry::{
    PluginRegistry, ResolverDescriptor, ResolverFactory, ResolverRegistry, StaticPluginRegistry,
    get_available_resolvers, get_resolver, register_resolver, set_preferred_resolver,
    try_get_resolver,
};
pub use resolved_path::ResolvedPath;
pub use resolver::Resolver;
pub use timestamp::Timestamp;
