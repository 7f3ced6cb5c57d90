//! Observation of attempts, backoff and recovery.
//!
//! Listeners are notified as the executor moves through its states. They
//! cannot influence control flow; an executor with no listeners behaves
//! identically to one with many.

use super::attempt::ErrorKind;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A step taken by the executor during one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent<K> {
    /// An attempt is about to invoke the operation.
    AttemptStarted {
        /// 1-indexed attempt number.
        attempt: u32,
        /// Attempt budget from the policy.
        max_attempts: u32,
    },
    /// The operation returned a value.
    AttemptSucceeded {
        /// Attempt that succeeded.
        attempt: u32,
    },
    /// The operation failed.
    AttemptFailed {
        /// Attempt that failed.
        attempt: u32,
        /// Kind of the failure.
        kind: K,
        /// Failure message.
        message: String,
        /// Whether the policy allows retrying this kind.
        retryable: bool,
    },
    /// The executor will wait before the next attempt.
    BackoffScheduled {
        /// Attempt that will run after the delay.
        next_attempt: u32,
        /// Delay before it.
        delay: Duration,
    },
    /// Every allowed attempt failed with a retryable kind.
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Kind of the last failure.
        kind: K,
    },
    /// The failure's kind is not retried, so remaining attempts were skipped.
    NotRetryable {
        /// Attempt that failed.
        attempt: u32,
        /// Kind of the failure.
        kind: K,
    },
    /// A recovery function produced the final value.
    Recovered {
        /// Kind whose recovery ran.
        kind: K,
    },
    /// No recovery was registered for the final kind.
    Unrecovered {
        /// Kind left unrecovered.
        kind: K,
    },
    /// The caller cancelled the execution.
    Cancelled {
        /// Attempts completed before cancellation.
        attempts: u32,
    },
}

/// Receives [`RetryEvent`]s from an executor.
pub trait RetryListener<K>: Send + Sync {
    /// Called synchronously for every event.
    fn on_event(&self, event: &RetryEvent<K>);
}

/// In-memory audit trail of every event seen.
#[derive(Debug)]
pub struct EventLog<K> {
    events: Mutex<Vec<RetryEvent<K>>>,
}

impl<K> Default for EventLog<K> {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl<K: Clone> EventLog<K> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<RetryEvent<K>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of attempts started across all recorded executions.
    pub fn attempts(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, RetryEvent::AttemptStarted { .. }))
            .count()
    }

    /// Delays scheduled across all recorded executions.
    pub fn delays(&self) -> Vec<Duration> {
        self.events()
            .iter()
            .filter_map(|event| match event {
                RetryEvent::BackoffScheduled { delay, .. } => Some(*delay),
                _ => None,
            })
            .collect()
    }
}

impl<K: ErrorKind> RetryListener<K> for EventLog<K> {
    fn on_event(&self, event: &RetryEvent<K>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Logs every event through `tracing`.
///
/// Attempts and backoff log at `debug`, failures at `warn`, recovery at
/// `info` and unrecovered exhaustion at `error`.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

#[cfg(feature = "tracing")]
impl<K: ErrorKind> RetryListener<K> for TracingListener {
    fn on_event(&self, event: &RetryEvent<K>) {
        match event {
            RetryEvent::AttemptStarted {
                attempt,
                max_attempts,
            } => tracing::debug!(attempt, max_attempts, "starting attempt"),
            RetryEvent::AttemptSucceeded { attempt } => {
                tracing::debug!(attempt, "attempt succeeded")
            }
            RetryEvent::AttemptFailed {
                attempt,
                kind,
                message,
                retryable,
            } => tracing::warn!(attempt, %kind, retryable, "attempt failed: {message}"),
            RetryEvent::BackoffScheduled {
                next_attempt,
                delay,
            } => tracing::debug!(next_attempt, ?delay, "waiting before retry"),
            RetryEvent::Exhausted { attempts, kind } => {
                tracing::info!(attempts, %kind, "retries exhausted, looking up recovery")
            }
            RetryEvent::NotRetryable { attempt, kind } => {
                tracing::info!(attempt, %kind, "failure not retryable, looking up recovery")
            }
            RetryEvent::Recovered { kind } => tracing::info!(%kind, "recovered"),
            RetryEvent::Unrecovered { kind } => {
                tracing::error!(%kind, "no recovery registered")
            }
            RetryEvent::Cancelled { attempts } => {
                tracing::info!(attempts, "retry cancelled")
            }
        }
    }
}
