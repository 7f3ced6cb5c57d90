//! Suspension between attempts.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Suspends the calling task between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `delay` before the next attempt.
    async fn sleep(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Records requested delays and returns immediately.
///
/// Lets tests assert the literal backoff schedule without waiting it out.
///
/// ```rust
/// use retrykit_core::retry::{Sleeper, TrackingSleeper};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let sleeper = TrackingSleeper::new();
/// sleeper.sleep(Duration::from_millis(5000)).await;
/// assert_eq!(sleeper.delays(), vec![Duration::from_millis(5000)]);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct TrackingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl TrackingSleeper {
    /// Create a sleeper with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

#[async_trait]
impl Sleeper for TrackingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
    }
}
