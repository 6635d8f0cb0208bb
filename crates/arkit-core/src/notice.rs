//! Change notification for resolver state.
//!
//! When state that influences resolution changes (for example the default
//! search path), a [`ResolverChanged`] notice is published on a
//! [`NoticeBus`]. Listeners ask the notice whether it affects the contexts
//! they care about and refresh accordingly.
//!
//! Delivery is synchronous: handlers run on the publishing thread before
//! `publish` returns.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, RwLock};

use crate::context::{ContextObject, ResolverContext};

type AffectsFn = dyn Fn(&ResolverContext) -> bool + Send + Sync;

/// Notice that resolution results may have changed.
#[derive(Clone)]
pub struct ResolverChanged {
    affects: Arc<AffectsFn>,
}

impl ResolverChanged {
    /// A notice affecting every context, including the empty one.
    pub fn affects_all() -> Self {
        Self::from_fn(|_| true)
    }

    /// A notice affecting contexts that hold an object equal to `object`.
    pub fn affecting_object<T: ContextObject>(object: T) -> Self {
        Self::from_fn(move |ctx| ctx.contains_object(&object))
    }

    /// A notice affecting exactly the contexts equal to `context`.
    pub fn affecting_context(context: ResolverContext) -> Self {
        Self::from_fn(move |ctx| *ctx == context)
    }

    /// A notice whose scope is decided by `affects`.
    pub fn from_fn<F>(affects: F) -> Self
    where
        F: Fn(&ResolverContext) -> bool + Send + Sync + 'static,
    {
        Self {
            affects: Arc::new(affects),
        }
    }

    pub fn affects_context(&self, context: &ResolverContext) -> bool {
        (self.affects)(context)
    }
}

impl Default for ResolverChanged {
    fn default() -> Self {
        Self::affects_all()
    }
}

impl fmt::Debug for ResolverChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChanged").finish_non_exhaustive()
    }
}

/// Handle returned by [`NoticeBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Handler invoked for each published notice.
pub type NoticeHandler = Arc<dyn Fn(&ResolverChanged) + Send + Sync>;

/// Publish/subscribe channel for [`ResolverChanged`] notices.
///
/// # Implementations
///
/// - `LocalNoticeBus` - in-process, synchronous delivery
/// - Host-specific bridges to an application-wide event system
pub trait NoticeBus: Send + Sync {
    /// Deliver `notice` to every current subscriber before returning.
    fn publish(&self, notice: &ResolverChanged);

    fn subscribe(&self, handler: NoticeHandler) -> Subscription;

    /// Returns `false` if the subscription was not registered.
    fn unsubscribe(&self, subscription: Subscription) -> bool;
}

/// In-process notice bus delivering in subscription order.
#[derive(Default)]
pub struct LocalNoticeBus {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(Subscription, NoticeHandler)>>,
}

impl LocalNoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().map_or(0, |handlers| handlers.len())
    }
}

impl fmt::Debug for LocalNoticeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalNoticeBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl NoticeBus for LocalNoticeBus {
    fn publish(&self, notice: &ResolverChanged) {
        // Snapshot so handlers may subscribe or unsubscribe re-entrantly.
        let handlers: Vec<NoticeHandler> = match self.handlers.read() {
            Ok(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|(_, h)| Arc::clone(h))
                .collect(),
        };
        tracing::debug!(subscribers = handlers.len(), "Publishing ResolverChanged");
        for handler in handlers {
            handler(notice);
        }
    }

    fn subscribe(&self, handler: NoticeHandler) -> Subscription {
        let subscription = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        handlers.push((subscription, handler));
        subscription
    }

    fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(s, _)| *s != subscription);
        handlers.len() != before
    }
}

/// Global notice bus instance
static NOTICE_BUS: LazyLock<Arc<LocalNoticeBus>> = LazyLock::new(|| Arc::new(LocalNoticeBus::new()));

/// Get the process-wide notice bus.
pub fn notice_bus() -> Arc<LocalNoticeBus> {
    NOTICE_BUS.clone()
}
