//! Example: retrying a flaky call and recovering when it keeps failing
//!
//! This example demonstrates:
//! 1. A call that succeeds on its third attempt
//! 2. A call that never succeeds and is answered by its recovery
//! 3. A non-retryable failure that skips straight to recovery
//!
//! Run with:
//! ```bash
//! cargo run -p retrykit-core --example retry_example
//! ```

use retrykit_core::prelude::*;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ApiErrorKind {
    Unavailable,
    BadRequest,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: AtomicU32,
    fail_count: u32,
    kind: ApiErrorKind,
}

impl UnreliableApi {
    fn new(fail_count: u32, kind: ApiErrorKind) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_count,
            kind,
        }
    }

    async fn call(&self) -> AttemptResult<String, ApiErrorKind> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if attempt <= self.fail_count {
            println!("  Attempt {attempt}: FAILED ({})", self.kind);
            Err(AttemptFailure::new(
                self.kind,
                format!("failure on attempt {attempt}"),
            ))
        } else {
            println!("  Attempt {attempt}: SUCCESS");
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

async fn run(
    title: &str,
    api: UnreliableApi,
    executor: &RetryExecutor<ApiErrorKind>,
    policy: &RetryPolicy<ApiErrorKind>,
    registry: &RecoveryRegistry<String, ApiErrorKind>,
) -> Result<(), Box<dyn Error>> {
    println!("\n=== {title} ===\n");
    let start = Instant::now();

    let result = executor
        .execute(
            || {
                let api = &api;
                async move { api.call().await }
            },
            policy,
            registry,
        )
        .await?;

    println!("\nResult: {result}");
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let policy = RetryPolicy::builder()
        .include([ApiErrorKind::Unavailable])
        .max_attempts(4)
        .initial_delay(Duration::from_millis(100))
        .multiplier(2.0)
        .build()?;

    let registry = RecoveryRegistry::builder()
        .recover(ApiErrorKind::Unavailable, |err| {
            println!("  Recovering from {}: {}", err.kind, err.message);
            "cached response".to_string()
        })
        .recover(ApiErrorKind::BadRequest, |_| "default response".to_string())
        .build();

    let log = Arc::new(EventLog::<ApiErrorKind>::new());
    let executor = RetryExecutor::<ApiErrorKind>::builder()
        .listener(log.clone())
        .build();

    run(
        "Example 1: Success on the third attempt (expect ~300ms)",
        UnreliableApi::new(2, ApiErrorKind::Unavailable),
        &executor,
        &policy,
        &registry,
    )
    .await?;

    run(
        "Example 2: Exhausted, answered by recovery (expect ~700ms)",
        UnreliableApi::new(u32::MAX, ApiErrorKind::Unavailable),
        &executor,
        &policy,
        &registry,
    )
    .await?;

    run(
        "Example 3: Non-retryable failure, single attempt",
        UnreliableApi::new(u32::MAX, ApiErrorKind::BadRequest),
        &executor,
        &policy,
        &registry,
    )
    .await?;

    println!("\nScheduled delays across all runs: {:?}", log.delays());
    Ok(())
}
