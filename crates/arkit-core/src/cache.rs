//! Scoped memoization of resolution results.
//!
//! A [`ResolverScopedCache`] guard opens a caching region on the current
//! thread. While a region is open, the resolver memoizes `resolve` results
//! in the innermost region, keyed by identifier and the current context.
//! Regions are independent: an inner region starts empty and never reads
//! its parents. Closing a region discards its entries.
//!
//! Cached results are not re-validated against the
//! filesystem; a file deleted mid-scope keeps resolving until the scope
//! closes. Results that came from the default search path remember the
//! search-path generation they were computed under and are dropped once
//! it changes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::ResolverContext;
use crate::error::StackError;
use crate::registry::get_resolver;
use crate::resolved_path::ResolvedPath;
use crate::resolver::Resolver;

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Per-scope data a resolver may attach when a cache scope begins.
///
/// The same value is handed back when the scope ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheScopeData {
    scope_id: Option<u64>,
}

impl CacheScopeData {
    pub const fn scope_id(&self) -> Option<u64> {
        self.scope_id
    }

    pub const fn set_scope_id(&mut self, id: u64) {
        self.scope_id = Some(id);
    }
}

/// Cache key: identifier plus the context it was resolved under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub identifier: String,
    pub context: ResolverContext,
}

impl CacheKey {
    pub fn new(identifier: impl Into<String>, context: ResolverContext) -> Self {
        Self {
            identifier: identifier.into(),
            context,
        }
    }
}

/// A memoized resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResolution {
    pub path: ResolvedPath,
    /// Default search path generation the result depended on, if any.
    pub search_path_generation: Option<u64>,
}

#[derive(Debug)]
struct Region {
    id: u64,
    entries: HashMap<CacheKey, CachedResolution>,
}

thread_local! {
    /// Open regions per owning cache, innermost last.
    static REGIONS: RefCell<HashMap<u64, Vec<Region>>> = RefCell::new(HashMap::new());
}

/// Thread-local stack of cache regions owned by one resolver instance.
#[derive(Debug)]
pub struct ScopedResolveCache {
    owner: u64,
}

impl Default for ScopedResolveCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopedResolveCache {
    pub fn new() -> Self {
        Self {
            owner: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Open a new, empty region on this thread and return its id.
    pub fn begin_scope(&self) -> u64 {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        REGIONS.with(|regions| {
            regions.borrow_mut().entry(self.owner).or_default().push(Region {
                id,
                entries: HashMap::new(),
            });
        });
        tracing::debug!(scope = id, depth = self.depth(), "Began resolver cache scope");
        id
    }

    /// Close the innermost region, which must be `scope_id`.
    pub fn end_scope(&self, scope_id: u64) -> Result<(), StackError> {
        REGIONS.with(|regions| {
            let mut regions = regions.borrow_mut();
            let Some(stack) = regions.get_mut(&self.owner) else {
                return Err(StackError::Empty);
            };
            match stack.last() {
                None => return Err(StackError::Empty),
                Some(top) if top.id != scope_id => {
                    return Err(StackError::OutOfOrder {
                        expected: scope_id,
                        found: top.id,
                    });
                }
                Some(_) => {}
            }
            if let Some(region) = stack.pop() {
                tracing::debug!(
                    scope = region.id,
                    discarded = region.entries.len(),
                    "Ended resolver cache scope"
                );
            }
            if stack.is_empty() {
                regions.remove(&self.owner);
            }
            Ok(())
        })
    }

    /// Number of open regions on this thread.
    pub fn depth(&self) -> usize {
        REGIONS.with(|regions| regions.borrow().get(&self.owner).map_or(0, Vec::len))
    }

    pub fn is_active(&self) -> bool {
        self.depth() > 0
    }

    /// Look up `key` in the innermost region.
    ///
    /// Entries computed under an older default search path generation than
    /// `current_generation` are evicted and reported as misses.
    pub fn lookup(&self, key: &CacheKey, current_generation: u64) -> Option<ResolvedPath> {
        REGIONS.with(|regions| {
            let mut regions = regions.borrow_mut();
            let region = regions.get_mut(&self.owner)?.last_mut()?;
            let entry = region.entries.get(key)?;
            match entry.search_path_generation {
                Some(generation) if generation != current_generation => {
                    region.entries.remove(key);
                    None
                }
                _ => Some(entry.path.clone()),
            }
        })
    }

    /// Record a result in the innermost region. No-op with no region open.
    pub fn store(&self, key: CacheKey, resolution: CachedResolution) {
        REGIONS.with(|regions| {
            if let Some(region) = regions
                .borrow_mut()
                .get_mut(&self.owner)
                .and_then(|stack| stack.last_mut())
            {
                region.entries.insert(key, resolution);
            }
        });
    }

    /// Drop every entry recorded under `context` in all open regions on
    /// this thread. Returns the number of entries removed.
    pub fn invalidate_context(&self, context: &ResolverContext) -> usize {
        REGIONS.with(|regions| {
            let mut regions = regions.borrow_mut();
            let Some(stack) = regions.get_mut(&self.owner) else {
                return 0;
            };
            let mut removed = 0;
            for region in stack.iter_mut() {
                let before = region.entries.len();
                region.entries.retain(|key, _| key.context != *context);
                removed += before - region.entries.len();
            }
            removed
        })
    }
}

/// Opens a resolver cache scope for the lifetime of the guard.
///
/// Calls the resolver's `begin_cache_scope` hook on construction and
/// `end_cache_scope` on drop. Like [`ResolverContextBinder`](crate::ResolverContextBinder),
/// guards must be dropped in reverse order of creation and stay on the
/// thread that created them.
#[must_use = "the cache scope ends as soon as the guard is dropped"]
pub struct ResolverScopedCache {
    resolver: Arc<dyn Resolver>,
    data: CacheScopeData,
    _not_send: PhantomData<*const ()>,
}

impl ResolverScopedCache {
    /// Open a scope on the process-wide resolver.
    ///
    /// # Panics
    ///
    /// Panics if the process-wide resolver cannot be constructed.
    pub fn new() -> Self {
        Self::with_resolver(get_resolver())
    }

    pub fn with_resolver(resolver: Arc<dyn Resolver>) -> Self {
        let mut data = CacheScopeData::default();
        resolver.begin_cache_scope(&mut data);
        Self {
            resolver,
            data,
            _not_send: PhantomData,
        }
    }

    pub const fn data(&self) -> &CacheScopeData {
        &self.data
    }
}

impl fmt::Debug for ResolverScopedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverScopedCache")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl Drop for ResolverScopedCache {
    fn drop(&mut self) {
        self.resolver.end_cache_scope(&mut self.data);
    }
}
