//! A remote call guarded by retry and recovery.

use crate::kind::RemoteErrorKind;
use retrykit_core::prelude::*;
use std::time::Duration;
use tracing::info;

/// Attempts made for one call, including the first.
pub const MAX_ATTEMPTS: u32 = 3;
/// Wait before the first retry.
pub const INITIAL_DELAY: Duration = Duration::from_millis(5000);
/// Growth of the wait after each retry (5s, then 10s).
pub const MULTIPLIER: f64 = 2.0;

/// Value returned by both recoveries once retries are exhausted.
pub const RECOVERED: &str = "ok";

/// Calls a remote endpoint, retrying access and timeout failures and
/// recovering with [`RECOVERED`] when retries run out.
#[derive(Debug)]
pub struct RetryService {
    executor: RetryExecutor<RemoteErrorKind>,
    policy: RetryPolicy<RemoteErrorKind>,
    registry: RecoveryRegistry<String, RemoteErrorKind>,
}

impl RetryService {
    /// Service with the default policy, logging through `tracing`.
    pub fn new() -> Result<Self, PolicyError> {
        let executor = RetryExecutor::<RemoteErrorKind>::builder()
            .listener(std::sync::Arc::new(TracingListener))
            .build();
        Ok(Self::with_parts(Self::default_policy()?, executor))
    }

    /// Service with a caller-supplied policy and executor.
    pub fn with_parts(
        policy: RetryPolicy<RemoteErrorKind>,
        executor: RetryExecutor<RemoteErrorKind>,
    ) -> Self {
        Self {
            executor,
            policy,
            registry: Self::default_registry(),
        }
    }

    /// Retry both remote kinds, 3 attempts, 5s delay doubling each retry.
    pub fn default_policy() -> Result<RetryPolicy<RemoteErrorKind>, PolicyError> {
        RetryPolicy::builder()
            .include([RemoteErrorKind::RemoteAccess, RemoteErrorKind::RemoteTimeout])
            .max_attempts(MAX_ATTEMPTS)
            .initial_delay(INITIAL_DELAY)
            .multiplier(MULTIPLIER)
            .build()
    }

    /// One recovery per remote kind, each answering [`RECOVERED`].
    pub fn default_registry() -> RecoveryRegistry<String, RemoteErrorKind> {
        RecoveryRegistry::builder()
            .recover(RemoteErrorKind::RemoteAccess, |err| {
                info!(error = %err.message, "final retry failed, running RemoteAccess recovery");
                RECOVERED.to_string()
            })
            .recover(RemoteErrorKind::RemoteTimeout, |err| {
                info!(error = %err.message, "final retry failed, running RemoteTimeout recovery");
                RECOVERED.to_string()
            })
            .build()
    }

    /// The policy applied to [`call`](Self::call).
    pub fn policy(&self) -> &RetryPolicy<RemoteErrorKind> {
        &self.policy
    }

    /// Perform the remote call under the retry policy.
    pub async fn call(&self) -> Result<String, RetryError<RemoteErrorKind>> {
        self.executor
            .execute(remote_call, &self.policy, &self.registry)
            .await
    }

    /// Like [`call`](Self::call), but gives up when `cancel` fires.
    pub async fn call_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> Result<String, RetryError<RemoteErrorKind>> {
        self.executor
            .execute_cancellable(remote_call, &self.policy, &self.registry, cancel)
            .await
    }
}

async fn remote_call() -> AttemptResult<String, RemoteErrorKind> {
    info!("executing remote call");
    Err(AttemptFailure::new(
        RemoteErrorKind::RemoteTimeout,
        "RPC call timed out",
    ))
}
