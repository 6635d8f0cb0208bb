//! The resolver capability.
//!
//! # Design
//!
//! A [`Resolver`] turns asset paths into identifiers and identifiers into
//! [`ResolvedPath`]s. Only the four identifier/resolution operations are
//! required; everything else has a default that suits a resolver with no
//! context of its own. Implementations must be `Send + Sync`: a single
//! instance serves every thread in the process.
//!
//! Resolution never fails with an error. An identifier that cannot be
//! resolved yields [`ResolvedPath::empty`].

use std::fmt;
use std::path::Path;

use crate::asset_info::AssetInfo;
use crate::binder;
use crate::cache::CacheScopeData;
use crate::context::ResolverContext;
use crate::error::ContextError;
use crate::paths::split_package_relative_path_inner;
use crate::resolved_path::ResolvedPath;
use crate::timestamp::Timestamp;

/// Pluggable asset resolution backend.
pub trait Resolver: Send + Sync + fmt::Debug {
    /// Canonical identifier for `asset_path`, optionally anchored to the
    /// location of another asset.
    fn create_identifier(&self, asset_path: &str, anchor: Option<&ResolvedPath>) -> String;

    /// Like [`create_identifier`](Self::create_identifier), for an asset
    /// that does not exist yet.
    fn create_identifier_for_new_asset(
        &self,
        asset_path: &str,
        anchor: Option<&ResolvedPath>,
    ) -> String;

    /// Location of the existing asset named by `identifier`, or empty.
    fn resolve(&self, identifier: &str) -> ResolvedPath;

    /// Location at which a new asset named by `identifier` would be created.
    fn resolve_for_new_asset(&self, identifier: &str) -> ResolvedPath;

    fn create_default_context(&self) -> ResolverContext {
        ResolverContext::new()
    }

    /// Context suited to resolving assets referenced by `asset_path`.
    fn create_default_context_for_asset(&self, _asset_path: &str) -> ResolverContext {
        ResolverContext::new()
    }

    /// Parse a context from its textual form.
    fn create_context_from_string(&self, _context_str: &str) -> Result<ResolverContext, ContextError> {
        Ok(ResolverContext::new())
    }

    /// Parse and merge `(uri_scheme, context_str)` pairs, in order.
    ///
    /// An empty scheme addresses this resolver. Any other scheme must be
    /// listed by [`uri_schemes`](Self::uri_schemes).
    fn create_context_from_strings(
        &self,
        context_strs: &[(&str, &str)],
    ) -> Result<ResolverContext, ContextError> {
        let schemes = self.uri_schemes();
        let mut merged = ResolverContext::new();
        for (scheme, context_str) in context_strs {
            if !scheme.is_empty() && !schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
                return Err(ContextError::UnsupportedScheme((*scheme).to_string()));
            }
            let parsed = self.create_context_from_string(context_str)?;
            merged = merged.merge(&parsed);
        }
        Ok(merged)
    }

    /// URI schemes this resolver handles.
    fn uri_schemes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Drop any state derived from `context` and notify listeners.
    fn refresh_context(&self, _context: &ResolverContext) {}

    /// Whether resolving `asset_path` may give different answers under
    /// different contexts.
    fn is_context_dependent_path(&self, _asset_path: &str) -> bool {
        false
    }

    /// Context currently bound on this thread, or the empty context.
    fn current_context(&self) -> ResolverContext {
        binder::current_context()
    }

    /// Called when `context` is bound on this thread.
    fn bind_context(&self, _context: &ResolverContext) {}

    /// Called when `context` is unbound on this thread.
    fn unbind_context(&self, _context: &ResolverContext) {}

    /// Called when a cache scope opens on this thread.
    fn begin_cache_scope(&self, _data: &mut CacheScopeData) {}

    /// Called when a cache scope closes, with the data set at begin.
    fn end_cache_scope(&self, _data: &mut CacheScopeData) {}

    /// Last-modified time of the resolved asset.
    fn modification_timestamp(&self, _asset_path: &str, _resolved: &ResolvedPath) -> Timestamp {
        Timestamp::invalid()
    }

    /// File extension of the asset `asset_path` names, without the dot.
    ///
    /// For a package-relative path this is the extension of the innermost
    /// packaged path. Empty when there is none.
    fn extension(&self, asset_path: &str) -> String {
        let (_, packaged) = split_package_relative_path_inner(asset_path);
        let path = if packaged.is_empty() { asset_path } else { packaged.as_str() };
        Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Descriptive metadata for the asset at `resolved`. Empty by default.
    fn asset_info(&self, _asset_path: &str, _resolved: &ResolvedPath) -> AssetInfo {
        AssetInfo::default()
    }
}
