//! Outcome of a single invocation of a retried operation.

use std::fmt;
use std::hash::Hash;

/// A discriminator tag identifying a category of failure.
///
/// Any small, copyable, hashable tag type qualifies; in practice this is a
/// closed `enum` such as:
///
/// ```rust
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum RemoteErrorKind {
///     RemoteAccess,
///     RemoteTimeout,
/// }
///
/// impl std::fmt::Display for RemoteErrorKind {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         std::fmt::Debug::fmt(self, f)
///     }
/// }
///
/// fn assert_kind<K: retrykit_core::retry::ErrorKind>() {}
/// assert_kind::<RemoteErrorKind>();
/// ```
pub trait ErrorKind: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<K> ErrorKind for K where K: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{}

/// A failed attempt: the error kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AttemptFailure<K: ErrorKind> {
    /// Category of the failure, used for retry classification and recovery lookup.
    pub kind: K,
    /// Message describing this particular failure.
    pub message: String,
}

impl<K: ErrorKind> AttemptFailure<K> {
    /// Create a failure of the given kind.
    pub fn new(kind: K, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Tagged outcome of one invocation: a success value or an [`AttemptFailure`].
pub type AttemptResult<T, K> = Result<T, AttemptFailure<K>>;
