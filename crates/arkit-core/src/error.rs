//! Error types for context parsing, resolver selection and scope stacks.
//!
//! Unresolvable asset paths are absent here: resolution
//! reports "not found" through an empty [`ResolvedPath`](crate::ResolvedPath)
//! rather than an error.

use thiserror::Error;

/// Errors produced while turning text into a [`ResolverContext`](crate::ResolverContext).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The context string cannot be interpreted by the resolver.
    #[error("Malformed context string {input:?}: {reason}")]
    Malformed { input: String, reason: String },

    /// A `(scheme, string)` pair named a URI scheme no resolver handles.
    #[error("No resolver handles URI scheme '{0}'")]
    UnsupportedScheme(String),

    /// A relative search directory could not be absolutized.
    #[error("Cannot determine current directory: {0}")]
    CurrentDir(String),
}

/// Errors raised while selecting or constructing the process-wide resolver.
///
/// These are configuration errors: nothing falls back silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The plugin registry reported no resolver implementations at all.
    #[error("No resolver implementations are registered")]
    NoResolvers,

    /// The preferred resolver is not among the registered implementations.
    #[error("Preferred resolver '{name}' not found (available: {available:?})")]
    PreferredNotFound {
        name: String,
        available: Vec<String>,
    },

    /// The plugin registry failed to construct the selected implementation.
    #[error("Failed to instantiate resolver '{type_name}': {reason}")]
    Instantiate { type_name: String, reason: String },
}

/// Misuse of a thread-local binding or cache-scope stack.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// Pop requested on an empty stack.
    #[error("Stack is empty")]
    Empty,

    /// Pop requested for an entry that is not on top of the stack.
    #[error("Out-of-order pop: expected entry {expected} on top, found {found}")]
    OutOfOrder { expected: u64, found: u64 },
}

/// Report a stack discipline violation detected in a guard's `Drop`.
///
/// Panics, unless the thread is already unwinding (a second panic would
/// abort the process), in which case the violation is logged.
pub(crate) fn stack_violation(guard: &str, error: StackError) {
    if std::thread::panicking() {
        tracing::error!(guard, %error, "Scope stack corrupted during unwind");
    } else {
        panic!("{guard} dropped out of order: {error}");
    }
}
