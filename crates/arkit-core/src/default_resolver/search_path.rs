//! Process-wide default search path.
//!
//! The directories [`DefaultResolver`](super::DefaultResolver) scans, after
//! any bound context, for search-relative identifiers. The initial value is
//! read from [`DEFAULT_SEARCH_PATH_ENV`](crate::config::DEFAULT_SEARCH_PATH_ENV)
//! on first use; afterwards it changes only through [`DefaultSearchPath::set`].
//!
//! Every successful change bumps a generation counter. Cached resolutions
//! that consulted the default search path remember the generation they
//! saw, which is how caches on other threads learn they are stale.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::config::ResolverConfig;
use crate::context::DefaultResolverContext;
use crate::notice::{NoticeBus, ResolverChanged, notice_bus};

type InitFn = dyn Fn() -> Vec<String> + Send + Sync;

/// Shared, mutable ordered list of search directories.
pub struct DefaultSearchPath {
    current: RwLock<Option<DefaultResolverContext>>,
    generation: AtomicU64,
    init: Box<InitFn>,
    notices: Arc<dyn NoticeBus>,
}

impl DefaultSearchPath {
    /// A search path initialized from the environment on first use.
    pub fn from_env(notices: Arc<dyn NoticeBus>) -> Self {
        Self::with_init(notices, || ResolverConfig::from_env().default_search_path)
    }

    /// A search path starting out as `paths`.
    pub fn new<I, S>(notices: Arc<dyn NoticeBus>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let initial = DefaultResolverContext::new(paths);
        Self {
            current: RwLock::new(Some(initial)),
            generation: AtomicU64::new(0),
            init: Box::new(Vec::<String>::new),
            notices,
        }
    }

    fn with_init<F>(notices: Arc<dyn NoticeBus>, init: F) -> Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            init: Box::new(init),
            notices,
        }
    }

    fn initial_value(&self) -> DefaultResolverContext {
        let paths = (self.init)();
        let context = DefaultResolverContext::new(&paths);
        tracing::info!(search_path = ?context.search_path(), "Initialized default search path");
        context
    }

    /// Snapshot of the current directories.
    pub fn get(&self) -> DefaultResolverContext {
        self.snapshot().0
    }

    /// Current directories together with the generation they belong to.
    pub fn snapshot(&self) -> (DefaultResolverContext, u64) {
        {
            let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(context) = current.as_ref() {
                return (context.clone(), self.generation.load(Ordering::Acquire));
            }
        }
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let context = current.get_or_insert_with(|| self.initial_value()).clone();
        (context, self.generation.load(Ordering::Acquire))
    }

    /// Replace the directories.
    ///
    /// The initial value is read first if nothing has read it yet, so
    /// setting the environment-derived value is a no-op. Relative entries
    /// are absolutized against the current working directory. Returns
    /// `false`, without notifying anyone, when the new value equals the
    /// current one. Otherwise a [`ResolverChanged`] notice
    /// affecting every context that holds a [`DefaultResolverContext`] is
    /// published on the calling thread before this returns.
    pub fn set<I, S>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let replacement = DefaultResolverContext::new(paths);
        {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let current = guard.get_or_insert_with(|| self.initial_value());
            if *current == replacement {
                tracing::debug!("Default search path unchanged");
                return false;
            }
            tracing::info!(search_path = ?replacement.search_path(), "Default search path changed");
            *current = replacement;
            self.generation.fetch_add(1, Ordering::AcqRel);
        }

        self.notices.publish(&ResolverChanged::from_fn(|ctx| {
            ctx.contains::<DefaultResolverContext>()
        }));
        true
    }

    /// Incremented by every effective [`set`](Self::set).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Bus that change notices are published on.
    pub fn notices(&self) -> &Arc<dyn NoticeBus> {
        &self.notices
    }
}

impl fmt::Debug for DefaultSearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("DefaultSearchPath")
            .field("current", &*current)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

/// Global default search path
static DEFAULT_SEARCH_PATH: LazyLock<Arc<DefaultSearchPath>> =
    LazyLock::new(|| Arc::new(DefaultSearchPath::from_env(notice_bus())));

/// Get the process-wide default search path.
pub fn global_search_path() -> Arc<DefaultSearchPath> {
    DEFAULT_SEARCH_PATH.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ResolverContext;
    use crate::notice::LocalNoticeBus;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn recording_bus() -> (Arc<LocalNoticeBus>, Arc<Mutex<Vec<ResolverChanged>>>) {
        let bus = Arc::new(LocalNoticeBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(Arc::new(move |notice: &ResolverChanged| {
            sink.lock().unwrap().push(notice.clone());
        }));
        (bus, seen)
    }

    #[test]
    fn lazy_init_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let search_path = DefaultSearchPath::with_init(Arc::new(LocalNoticeBus::new()), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            vec!["/from/env".to_string()]
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let first = search_path.get();
        let second = search_path.get();
        assert_eq!(first, second);
        assert_eq!(first.search_path().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[test]
    fn set_replaces_and_notifies_once() {
        let (bus, seen) = recording_bus();
        let search_path = DefaultSearchPath::new(bus, Vec::<String>::new());
        assert!(search_path.get().is_empty());
        assert_eq!(search_path.generation(), 0);

        assert!(search_path.set(["/a", "/b"]));
        assert_eq!(search_path.get().search_path(), ["/a", "/b"]);
        assert_eq!(search_path.generation(), 1);

        assert!(!search_path.set(["/a", "/b"]));
        assert_eq!(search_path.generation(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn first_set_compares_against_initial_value() {
        let (bus, seen) = recording_bus();
        let search_path =
            DefaultSearchPath::with_init(bus, || vec!["/from/env".to_string()]);

        assert!(!search_path.set(["/from/env"]));
        assert_eq!(search_path.generation(), 0);
        assert!(seen.lock().unwrap().is_empty());

        assert!(search_path.set(["/elsewhere"]));
        assert_eq!(search_path.generation(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn concurrent_readers_see_whole_values() {
        let first = DefaultResolverContext::new(["/a1", "/a2", "/a3"]);
        let second = DefaultResolverContext::new(["/b1", "/b2", "/b3", "/b4"]);
        let search_path = DefaultSearchPath::new(
            Arc::new(LocalNoticeBus::new()),
            first.search_path().to_vec(),
        );

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..500 {
                    let next = if round % 2 == 0 { &second } else { &first };
                    search_path.set(next.search_path());
                }
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        let (seen, _) = search_path.snapshot();
                        assert!(seen == first || seen == second, "torn read: {seen:?}");
                    }
                });
            }
        });
        assert_eq!(search_path.generation(), 500);
    }

    #[test]
    fn notice_affects_default_contexts_only() {
        let (bus, seen) = recording_bus();
        let search_path = DefaultSearchPath::new(bus, Vec::<String>::new());
        search_path.set(["/somewhere"]);

        let notices = seen.lock().unwrap();
        let notice = &notices[0];
        assert!(notice.affects_context(&DefaultResolverContext::default().into()));
        assert!(!notice.affects_context(&ResolverContext::new()));
    }

    #[test]
    fn handlers_observe_new_value() {
        let bus = Arc::new(LocalNoticeBus::new());
        let search_path = Arc::new(DefaultSearchPath::new(
            Arc::clone(&bus) as Arc<dyn NoticeBus>,
            Vec::<String>::new(),
        ));
        let observed = Arc::new(Mutex::new(None));
        {
            let search_path = Arc::clone(&search_path);
            let observed = Arc::clone(&observed);
            bus.subscribe(Arc::new(move |_: &ResolverChanged| {
                *observed.lock().unwrap() = Some(search_path.get());
            }));
        }

        search_path.set(["/new"]);
        let observed = observed.lock().unwrap().clone().unwrap();
        assert_eq!(observed, search_path.get());
        assert!(!observed.is_empty());
    }
}
