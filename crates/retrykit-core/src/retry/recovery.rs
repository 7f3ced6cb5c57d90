//! Recovery functions keyed by error kind.

use super::attempt::{AttemptFailure, ErrorKind};
use std::collections::HashMap;
use std::fmt;

/// A fallback computation for one error kind.
pub type RecoveryFn<T, K> = Box<dyn Fn(&AttemptFailure<K>) -> T + Send + Sync>;

/// Mapping from error kind to the recovery producing a fallback value.
///
/// Built once through [`RecoveryRegistry::builder`] and read-only afterwards.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::retry::{AttemptFailure, RecoveryRegistry};
///
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Kind { RemoteTimeout }
/// # impl std::fmt::Display for Kind {
/// #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{self:?}") }
/// # }
/// let registry = RecoveryRegistry::builder()
///     .recover(Kind::RemoteTimeout, |_err| "ok".to_string())
///     .build();
///
/// let failure = AttemptFailure::new(Kind::RemoteTimeout, "timed out");
/// let recover = registry.lookup(&failure.kind).unwrap();
/// assert_eq!(recover(&failure), "ok");
/// ```
pub struct RecoveryRegistry<T, K: ErrorKind> {
    handlers: HashMap<K, RecoveryFn<T, K>>,
}

impl<T, K: ErrorKind> RecoveryRegistry<T, K> {
    /// Create a new builder.
    pub fn builder() -> RecoveryRegistryBuilder<T, K> {
        RecoveryRegistryBuilder {
            handlers: HashMap::new(),
        }
    }

    /// A registry with no recoveries; every exhausted execution is unrecovered.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Find the recovery registered for `kind`.
    pub fn lookup(&self, kind: &K) -> Option<&RecoveryFn<T, K>> {
        self.handlers.get(kind)
    }

    /// Whether a recovery is registered for `kind`.
    pub fn contains(&self, kind: &K) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Number of registered recoveries.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no recovery is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T, K: ErrorKind> fmt::Debug for RecoveryRegistry<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryRegistry")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`RecoveryRegistry`].
pub struct RecoveryRegistryBuilder<T, K: ErrorKind> {
    handlers: HashMap<K, RecoveryFn<T, K>>,
}

impl<T, K: ErrorKind> RecoveryRegistryBuilder<T, K> {
    /// Register the recovery for `kind`, replacing any earlier one.
    pub fn recover<F>(mut self, kind: K, recovery: F) -> Self
    where
        F: Fn(&AttemptFailure<K>) -> T + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Box::new(recovery));
        self
    }

    /// Freeze the registry.
    pub fn build(self) -> RecoveryRegistry<T, K> {
        RecoveryRegistry {
            handlers: self.handlers,
        }
    }
}
