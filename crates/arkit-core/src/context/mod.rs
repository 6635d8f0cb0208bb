//! Resolver contexts: value objects that parameterize resolution.
//!
//! A [`ResolverContext`] is a small, immutable bag of context objects, at
//! most one per concrete type. Each resolver implementation looks up the
//! object type it understands (the filesystem resolver uses
//! [`DefaultResolverContext`]) and ignores the rest, so one context value
//! can carry parameters for several backends at once.
//!
//! Contexts are compared and hashed by value. Object order does not
//! matter: objects are kept sorted by type.

mod default_context;

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use default_context::DefaultResolverContext;

/// A value that can be stored in a [`ResolverContext`].
///
/// Implemented for every `Debug + Eq + Hash + Send + Sync + 'static` type.
pub trait ContextObject: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Value equality against another object of possibly different type.
    fn dyn_eq(&self, other: &dyn ContextObject) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);

    fn type_name(&self) -> &'static str;
}

impl<T> ContextObject for T
where
    T: Any + fmt::Debug + Eq + Hash + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn ContextObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[derive(Clone)]
struct Entry {
    type_id: TypeId,
    object: Arc<dyn ContextObject>,
}

/// Immutable container of context objects.
///
/// Cloning is cheap: objects are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct ResolverContext {
    entries: Vec<Entry>,
}

impl ResolverContext {
    /// The empty context.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A context holding a single object.
    pub fn from_object<T: ContextObject>(object: T) -> Self {
        Self::new().with(object)
    }

    /// Add `object`, replacing any object of the same type.
    #[must_use]
    pub fn with<T: ContextObject>(mut self, object: T) -> Self {
        let type_id = TypeId::of::<T>();
        let entry = Entry {
            type_id,
            object: Arc::new(object),
        };
        match self.entries.binary_search_by(|e| e.type_id.cmp(&type_id)) {
            Ok(idx) => self.entries[idx] = entry,
            Err(idx) => self.entries.insert(idx, entry),
        }
        self
    }

    /// Combine two contexts.
    ///
    /// Objects already in `self` win; `other` only contributes types that
    /// `self` lacks.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        for entry in &other.entries {
            if let Err(idx) = self
                .entries
                .binary_search_by(|e| e.type_id.cmp(&entry.type_id))
            {
                self.entries.insert(idx, entry.clone());
            }
        }
        self
    }

    /// The object of type `T`, if present.
    pub fn get<T: ContextObject>(&self) -> Option<&T> {
        let type_id = TypeId::of::<T>();
        self.entries
            .binary_search_by(|e| e.type_id.cmp(&type_id))
            .ok()
            .and_then(|idx| self.entries[idx].object.as_any().downcast_ref::<T>())
    }

    pub fn contains<T: ContextObject>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Whether any held object equals `object`.
    pub fn contains_object(&self, object: &dyn ContextObject) -> bool {
        let type_id = object.as_any().type_id();
        self.entries
            .iter()
            .any(|e| e.type_id == type_id && e.object.dyn_eq(object))
    }

    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the held objects in type order.
    pub fn objects(&self) -> impl Iterator<Item = &dyn ContextObject> {
        self.entries.iter().map(|e| e.object.as_ref())
    }
}

impl PartialEq for ResolverContext {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.type_id == b.type_id && a.object.dyn_eq(b.object.as_ref()))
    }
}

impl Eq for ResolverContext {}

impl Hash for ResolverContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.len().hash(state);
        for entry in &self.entries {
            entry.type_id.hash(state);
            entry.object.dyn_hash(state);
        }
    }
}

impl fmt::Debug for ResolverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.object))
            .finish()
    }
}

impl fmt::Display for ResolverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("ResolverContext()");
        }
        f.write_str("ResolverContext(")?;
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:?}", entry.object.type_name(), entry.object)?;
        }
        f.write_str(")")
    }
}

impl From<DefaultResolverContext> for ResolverContext {
    fn from(context: DefaultResolverContext) -> Self {
        Self::from_object(context)
    }
}
