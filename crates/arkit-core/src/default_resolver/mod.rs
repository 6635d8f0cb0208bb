//! Filesystem-backed reference resolver.
//!
//! # Identifiers
//!
//! Asset paths come in three flavors:
//!
//! - absolute: `/assets/props/chair.usd`
//! - file-relative: `./chair.usd`, `../props/chair.usd`
//! - search-relative: `props/chair.usd`
//!
//! Relative paths given with an anchor are anchored to the anchor's
//! directory. A search-relative path keeps its search-relative form when
//! nothing resolves next to the anchor ("look here first"), so it can still
//! be found through the search path at resolve time. That check goes
//! through [`Resolver::resolve`] and therefore honors an open cache scope.
//!
//! # Resolution order
//!
//! 1. Absolute identifiers resolve to themselves if they exist.
//! 2. Relative identifiers are tried against the current working directory.
//! 3. Search-relative identifiers are tried against each directory of the
//!    bound [`DefaultResolverContext`], then each directory of the
//!    [`DefaultSearchPath`].
//!
//! The first existing candidate wins.

mod search_path;

use std::fmt;
use std::sync::Arc;

use crate::cache::{CacheKey, CacheScopeData, CachedResolution, ScopedResolveCache};
use crate::context::{DefaultResolverContext, ResolverContext};
use crate::error::{ContextError, StackError, stack_violation};
use crate::notice::ResolverChanged;
use crate::paths::{
    absolute_path, anchor_relative_path, exists, is_relative, is_search_relative, join_paths,
    normalize_path, parent_directory, split_path_list,
};
use crate::resolved_path::ResolvedPath;
use crate::resolver::Resolver;
use crate::timestamp::Timestamp;

pub use search_path::{DefaultSearchPath, global_search_path};

/// Type name under which [`DefaultResolver`] is registered.
pub const DEFAULT_RESOLVER_TYPE_NAME: &str = "DefaultResolver";

/// Resolver for assets stored on the local filesystem.
pub struct DefaultResolver {
    search_path: Arc<DefaultSearchPath>,
    cache: ScopedResolveCache,
}

impl Default for DefaultResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultResolver {
    /// A resolver using the process-wide default search path.
    pub fn new() -> Self {
        Self::with_search_path(global_search_path())
    }

    pub fn with_search_path(search_path: Arc<DefaultSearchPath>) -> Self {
        Self {
            search_path,
            cache: ScopedResolveCache::new(),
        }
    }

    pub fn search_path(&self) -> &Arc<DefaultSearchPath> {
        &self.search_path
    }

    /// Replace the process-wide default search path.
    ///
    /// Returns `false` when the value did not change.
    pub fn set_default_search_path<I, S>(paths: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        global_search_path().set(paths)
    }

    /// The process-wide default search path.
    pub fn default_search_path() -> Vec<String> {
        global_search_path().get().search_path().to_vec()
    }

    fn resolve_uncached(&self, identifier: &str, context: &ResolverContext) -> CachedResolution {
        let found = |path: String| CachedResolution {
            path: ResolvedPath::new(path),
            search_path_generation: None,
        };

        if !is_relative(identifier) {
            return if exists(identifier) {
                found(identifier.to_string())
            } else {
                tracing::debug!(identifier, "Absolute identifier does not exist");
                CachedResolution {
                    path: ResolvedPath::empty(),
                    search_path_generation: None,
                }
            };
        }

        match absolute_path(identifier) {
            Ok(candidate) if exists(&candidate) => return found(candidate),
            Ok(_) => {}
            Err(e) => tracing::debug!(identifier, error = %e, "Skipping working directory"),
        }

        if !is_search_relative(identifier) {
            return CachedResolution {
                path: ResolvedPath::empty(),
                search_path_generation: None,
            };
        }

        let bound = context
            .get::<DefaultResolverContext>()
            .and_then(|bound| find_in(bound.search_path(), identifier));
        if let Some(path) = bound {
            tracing::debug!(identifier, %path, "Resolved through bound context");
            return found(path);
        }

        let (defaults, generation) = self.search_path.snapshot();
        let path = find_in(defaults.search_path(), identifier)
            .map(ResolvedPath::new)
            .unwrap_or_default();
        if path.is_empty() {
            tracing::debug!(identifier, "Identifier not found on any search path");
        }
        CachedResolution {
            path,
            search_path_generation: Some(generation),
        }
    }
}

fn find_in(directories: &[String], identifier: &str) -> Option<String> {
    directories
        .iter()
        .map(|dir| normalize_path(&join_paths(dir, identifier)))
        .find(|candidate| exists(candidate))
}

impl fmt::Debug for DefaultResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultResolver")
            .field("search_path", &self.search_path)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Resolver for DefaultResolver {
    fn create_identifier(&self, asset_path: &str, anchor: Option<&ResolvedPath>) -> String {
        if asset_path.is_empty() {
            return String::new();
        }
        let Some(anchor) = anchor.filter(|a| !a.is_empty()) else {
            return normalize_path(asset_path);
        };
        if !is_relative(asset_path) {
            return normalize_path(asset_path);
        }

        let anchored = anchor_relative_path(anchor.as_str(), asset_path);
        if is_search_relative(asset_path) && self.resolve(&anchored).is_empty() {
            return normalize_path(asset_path);
        }
        normalize_path(&anchored)
    }

    fn create_identifier_for_new_asset(
        &self,
        asset_path: &str,
        anchor: Option<&ResolvedPath>,
    ) -> String {
        if asset_path.is_empty() {
            return String::new();
        }
        if !is_relative(asset_path) {
            return normalize_path(asset_path);
        }

        let anchored = match anchor.filter(|a| !a.is_empty()) {
            Some(anchor) => anchor_relative_path(anchor.as_str(), asset_path),
            None => asset_path.to_string(),
        };
        absolute_path(&anchored).unwrap_or_else(|e| {
            tracing::warn!(asset_path, error = %e, "Could not absolutize new asset path");
            normalize_path(&anchored)
        })
    }

    fn resolve(&self, identifier: &str) -> ResolvedPath {
        if identifier.is_empty() {
            return ResolvedPath::empty();
        }

        let context = self.current_context();
        if !self.cache.is_active() {
            return self.resolve_uncached(identifier, &context).path;
        }

        let key = CacheKey::new(identifier, context);
        if let Some(hit) = self.cache.lookup(&key, self.search_path.generation()) {
            tracing::debug!(identifier, path = %hit, "Resolve cache hit");
            return hit;
        }
        let resolution = self.resolve_uncached(identifier, &key.context);
        tracing::debug!(identifier, path = %resolution.path, "Resolve cache miss");
        let path = resolution.path.clone();
        self.cache.store(key, resolution);
        path
    }

    fn resolve_for_new_asset(&self, identifier: &str) -> ResolvedPath {
        if identifier.is_empty() {
            return ResolvedPath::empty();
        }
        match absolute_path(identifier) {
            Ok(path) => ResolvedPath::new(path),
            Err(e) => {
                tracing::warn!(identifier, error = %e, "Could not resolve new asset");
                ResolvedPath::empty()
            }
        }
    }

    fn create_default_context_for_asset(&self, asset_path: &str) -> ResolverContext {
        if asset_path.is_empty() {
            return DefaultResolverContext::default().into();
        }
        match absolute_path(asset_path) {
            Ok(abs) => DefaultResolverContext::new([parent_directory(&abs)]).into(),
            Err(e) => {
                tracing::warn!(asset_path, error = %e, "Could not determine asset directory");
                DefaultResolverContext::default().into()
            }
        }
    }

    fn create_context_from_string(&self, context_str: &str) -> Result<ResolverContext, ContextError> {
        if context_str.contains('\0') {
            return Err(ContextError::Malformed {
                input: context_str.to_string(),
                reason: "contains a NUL byte".to_string(),
            });
        }
        let context = DefaultResolverContext::try_new(split_path_list(context_str))?;
        Ok(context.into())
    }

    fn refresh_context(&self, context: &ResolverContext) {
        let dropped = self.cache.invalidate_context(context);
        if dropped == 0 {
            return;
        }
        tracing::debug!(%context, dropped, "Refreshed resolver context");
        self.search_path
            .notices()
            .publish(&ResolverChanged::affecting_context(context.clone()));
    }

    fn is_context_dependent_path(&self, asset_path: &str) -> bool {
        is_search_relative(asset_path)
    }

    fn begin_cache_scope(&self, data: &mut CacheScopeData) {
        data.set_scope_id(self.cache.begin_scope());
    }

    fn end_cache_scope(&self, data: &mut CacheScopeData) {
        let result = data
            .scope_id()
            .map_or(Err(StackError::Empty), |id| self.cache.end_scope(id));
        if let Err(e) = result {
            stack_violation("ResolverScopedCache", e);
        }
    }

    fn modification_timestamp(&self, _asset_path: &str, resolved: &ResolvedPath) -> Timestamp {
        match resolved.as_option() {
            Some(path) => Timestamp::of_file(path),
            None => Timestamp::invalid(),
        }
    }
}
