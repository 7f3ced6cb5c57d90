//! The retry loop: attempt, back off, recover.

use super::attempt::{AttemptResult, ErrorKind};
use super::listener::{RetryEvent, RetryListener};
use super::policy::RetryPolicy;
use super::recovery::RecoveryRegistry;
use super::sleeper::{Sleeper, TokioSleeper};
use crate::error::{RetryError, UnrecoveredError};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Executes an operation under a [`RetryPolicy`], recovering through a
/// [`RecoveryRegistry`] once attempts run out.
///
/// ```text
/// ATTEMPTING -> SUCCESS
///            -> RETRY -> ATTEMPTING
///            -> EXHAUSTED -> RECOVERING -> RECOVERED | UNRECOVERED
/// ```
///
/// Attempts are strictly sequential. The executor holds no per-execution
/// state, so one instance can serve concurrent callers.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::retry::{AttemptFailure, RecoveryRegistry, RetryExecutor, RetryPolicy};
/// use std::time::Duration;
///
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Kind { RemoteTimeout }
/// # impl std::fmt::Display for Kind {
/// #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{self:?}") }
/// # }
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::builder()
///     .include([Kind::RemoteTimeout])
///     .max_attempts(2)
///     .initial_delay(Duration::from_millis(1))
///     .build()
///     .unwrap();
/// let registry = RecoveryRegistry::builder()
///     .recover(Kind::RemoteTimeout, |_| "ok".to_string())
///     .build();
///
/// let result = RetryExecutor::new()
///     .execute(
///         || async { Err(AttemptFailure::new(Kind::RemoteTimeout, "timed out")) },
///         &policy,
///         &registry,
///     )
///     .await;
///
/// assert_eq!(result.unwrap(), "ok");
/// # });
/// ```
#[derive(Clone)]
pub struct RetryExecutor<K: ErrorKind> {
    sleeper: Arc<dyn Sleeper>,
    listeners: Vec<Arc<dyn RetryListener<K>>>,
}

impl<K: ErrorKind> RetryExecutor<K> {
    /// An executor sleeping on the tokio timer, with no listeners.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder to customise sleeping and observation.
    pub fn builder() -> RetryExecutorBuilder<K> {
        RetryExecutorBuilder::default()
    }

    /// Run `operation` until it succeeds or the policy gives up.
    ///
    /// # Returns
    /// - `Ok(T)`: the operation's value, or the recovery value after exhaustion
    /// - `Err(RetryError::Unrecovered)`: exhausted with no recovery for the final kind
    pub async fn execute<T, F, Fut>(
        &self,
        operation: F,
        policy: &RetryPolicy<K>,
        registry: &RecoveryRegistry<T, K>,
    ) -> Result<T, RetryError<K>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptResult<T, K>>,
    {
        let never = CancellationToken::new();
        self.execute_cancellable(operation, policy, registry, &never)
            .await
    }

    /// Like [`execute`](Self::execute), but aborts when `cancel` fires.
    ///
    /// Cancellation is observed before the first attempt and during every
    /// backoff delay. Once observed, no further attempt or recovery runs and
    /// the result is [`RetryError::Cancelled`].
    pub async fn execute_cancellable<T, F, Fut>(
        &self,
        mut operation: F,
        policy: &RetryPolicy<K>,
        registry: &RecoveryRegistry<T, K>,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<K>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptResult<T, K>>,
    {
        if cancel.is_cancelled() {
            return Err(self.cancelled(0));
        }

        let max_attempts = policy.max_attempts();
        let mut attempt = 1;

        let (failure, retryable) = loop {
            self.emit(RetryEvent::AttemptStarted {
                attempt,
                max_attempts,
            });

            let failure = match operation().await {
                Ok(value) => {
                    self.emit(RetryEvent::AttemptSucceeded { attempt });
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            let retryable = policy.is_retryable(&failure.kind);
            self.emit(RetryEvent::AttemptFailed {
                attempt,
                kind: failure.kind,
                message: failure.message.clone(),
                retryable,
            });

            if !retryable || attempt >= max_attempts {
                break (failure, retryable);
            }

            let next_attempt = attempt + 1;
            if let Some(delay) = policy.delay_before_attempt(next_attempt) {
                self.emit(RetryEvent::BackoffScheduled {
                    next_attempt,
                    delay,
                });

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(self.cancelled(attempt)),
                    _ = self.sleeper.sleep(delay) => {}
                }
            }
            attempt = next_attempt;
        };

        if retryable {
            self.emit(RetryEvent::Exhausted {
                attempts: attempt,
                kind: failure.kind,
            });
        } else {
            self.emit(RetryEvent::NotRetryable {
                attempt,
                kind: failure.kind,
            });
        }

        match registry.lookup(&failure.kind) {
            Some(recover) => {
                let value = recover(&failure);
                self.emit(RetryEvent::Recovered { kind: failure.kind });
                Ok(value)
            }
            None => {
                self.emit(RetryEvent::Unrecovered { kind: failure.kind });
                Err(UnrecoveredError {
                    kind: failure.kind,
                    message: failure.message,
                    attempts: attempt,
                }
                .into())
            }
        }
    }

    fn cancelled(&self, attempts: u32) -> RetryError<K> {
        self.emit(RetryEvent::Cancelled { attempts });
        RetryError::Cancelled { attempts }
    }

    fn emit(&self, event: RetryEvent<K>) {
        for listener in &self.listeners {
            listener.on_event(&event);
        }
    }
}

impl<K: ErrorKind> Default for RetryExecutor<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ErrorKind> fmt::Debug for RetryExecutor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("sleeper", &"<sleeper>")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Builder for [`RetryExecutor`].
pub struct RetryExecutorBuilder<K: ErrorKind> {
    sleeper: Option<Arc<dyn Sleeper>>,
    listeners: Vec<Arc<dyn RetryListener<K>>>,
}

impl<K: ErrorKind> Default for RetryExecutorBuilder<K> {
    fn default() -> Self {
        Self {
            sleeper: None,
            listeners: Vec::new(),
        }
    }
}

impl<K: ErrorKind> RetryExecutorBuilder<K> {
    /// Replace the default [`TokioSleeper`].
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Add a listener. Listeners are notified in registration order.
    pub fn listener(mut self, listener: Arc<dyn RetryListener<K>>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Build the executor.
    pub fn build(self) -> RetryExecutor<K> {
        RetryExecutor {
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
            listeners: self.listeners,
        }
    }
}

/// Run `operation` with a default [`RetryExecutor`].
///
/// Shorthand for `RetryExecutor::new().execute(operation, policy, registry)`.
pub async fn execute<T, K, F, Fut>(
    operation: F,
    policy: &RetryPolicy<K>,
    registry: &RecoveryRegistry<T, K>,
) -> Result<T, RetryError<K>>
where
    K: ErrorKind,
    F: FnMut() -> Fut,
    Fut: Future<Output = AttemptResult<T, K>>,
{
    RetryExecutor::new()
        .execute(operation, policy, registry)
        .await
}
