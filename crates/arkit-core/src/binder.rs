//! Thread-local context binding.
//!
//! Each thread owns a stack of bound contexts. The top of the stack is the
//! thread's current context; with nothing bound the current context is the
//! empty one. Bindings are created and removed only through
//! [`ResolverContextBinder`], whose `Drop` guarantees the pop on every exit
//! path.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::ResolverContext;
use crate::error::{StackError, stack_violation};
use crate::registry::get_resolver;
use crate::resolver::Resolver;

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

struct Binding {
    id: u64,
    context: ResolverContext,
    resolver: Arc<dyn Resolver>,
}

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Binding>> = const { RefCell::new(Vec::new()) };
}

/// The context on top of this thread's stack, or the empty context.
pub fn current_context() -> ResolverContext {
    CONTEXT_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .map(|binding| binding.context.clone())
            .unwrap_or_default()
    })
}

/// Whether anything is bound on this thread.
///
/// Distinguishes "empty context bound" from "nothing bound".
pub fn has_bound_context() -> bool {
    CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
}

/// Number of bindings on this thread's stack.
pub fn depth() -> usize {
    CONTEXT_STACK.with(|stack| stack.borrow().len())
}

fn push(context: ResolverContext, resolver: Arc<dyn Resolver>) -> u64 {
    let id = NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed);
    CONTEXT_STACK.with(|stack| {
        stack.borrow_mut().push(Binding {
            id,
            context,
            resolver,
        });
    });
    id
}

fn pop(id: u64) -> Result<(), StackError> {
    CONTEXT_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        match stack.last() {
            None => Err(StackError::Empty),
            Some(top) if top.id != id => Err(StackError::OutOfOrder {
                expected: id,
                found: top.id,
            }),
            Some(_) => {
                stack.pop();
                Ok(())
            }
        }
    })
}

/// Binds a context for the lifetime of the guard.
///
/// On construction the resolver's `bind_context` hook runs and the context
/// is pushed; on drop `unbind_context` runs and the context is popped.
/// Guards must be dropped in reverse order of creation; anything else is a
/// programming error and panics. The guard is `!Send` because it manages
/// this thread's stack.
///
/// # Example
///
/// ```ignore
/// let context = DefaultResolverContext::new(["/assets/shared"]).into();
/// {
///     let _binder = ResolverContextBinder::new(context);
///     let path = get_resolver().resolve("props/chair.usd");
/// }
/// // previous context restored here
/// ```
#[must_use = "the context is unbound as soon as the binder is dropped"]
pub struct ResolverContextBinder {
    resolver: Arc<dyn Resolver>,
    context: ResolverContext,
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl ResolverContextBinder {
    /// Bind `context` against the process-wide resolver.
    ///
    /// # Panics
    ///
    /// Panics if the process-wide resolver cannot be constructed.
    pub fn new(context: ResolverContext) -> Self {
        Self::with_resolver(get_resolver(), context)
    }

    /// Bind `context` against an explicit resolver.
    pub fn with_resolver(resolver: Arc<dyn Resolver>, context: ResolverContext) -> Self {
        resolver.bind_context(&context);
        let id = push(context.clone(), Arc::clone(&resolver));
        tracing::debug!(binding = id, %context, "Bound resolver context");
        Self {
            resolver,
            context,
            id,
            _not_send: PhantomData,
        }
    }

    pub const fn context(&self) -> &ResolverContext {
        &self.context
    }

    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }
}

impl fmt::Debug for ResolverContextBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverContextBinder")
            .field("id", &self.id)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Drop for ResolverContextBinder {
    fn drop(&mut self) {
        self.resolver.unbind_context(&self.context);
        if let Err(e) = pop(self.id) {
            stack_violation("ResolverContextBinder", e);
        }
    }
}

/// Resolver bound alongside the current context, if any.
pub fn current_binding_resolver() -> Option<Arc<dyn Resolver>> {
    CONTEXT_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .map(|binding| Arc::clone(&binding.resolver))
    })
}
