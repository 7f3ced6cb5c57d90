#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Bounded retry with exponential backoff and per-error-kind recovery.
//!
//! An operation that fails with a retryable error kind is re-invoked up to a
//! fixed number of times, waiting longer before each attempt. When attempts
//! run out, a recovery function registered for the final error kind supplies
//! the result instead.
//!
//! - **Policies** via [`RetryPolicy`](retry::RetryPolicy): include/exclude
//!   classification, attempt budget, delay, multiplier, cap and jitter
//! - **Recovery** via [`RecoveryRegistry`](retry::RecoveryRegistry), keyed by error kind
//! - **Execution** via [`RetryExecutor`](retry::RetryExecutor), with cancellation
//! - **Observation** via [`RetryListener`](retry::RetryListener)
//! - **Configuration** from TOML and environment variables via
//!   [`RetryPolicyConfig`](config::RetryPolicyConfig)
//!
//! # Examples
//!
//! ```rust
//! use retrykit_core::prelude::*;
//! use std::time::Duration;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind {
//!     RemoteAccess,
//!     RemoteTimeout,
//! }
//!
//! impl std::fmt::Display for Kind {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .include([Kind::RemoteAccess, Kind::RemoteTimeout])
//!     .max_attempts(3)
//!     .initial_delay(Duration::from_millis(5000))
//!     .multiplier(2.0)
//!     .build()?;
//!
//! let registry = RecoveryRegistry::builder()
//!     .recover(Kind::RemoteTimeout, |_| "ok".to_string())
//!     .build();
//!
//! let result = RetryExecutor::new()
//!     .execute(
//!         || async { Err(AttemptFailure::new(Kind::RemoteTimeout, "RPC call timed out")) },
//!         &policy,
//!         &registry,
//!     )
//!     .await?;
//! assert_eq!(result, "ok");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod retry;

pub use retry::execute;

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use retrykit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RetryPolicyConfig;
    pub use crate::error::{ConfigError, PolicyError, RetryError, UnrecoveredError};
    pub use crate::error_boundary;
    #[cfg(feature = "tracing")]
    pub use crate::retry::TracingListener;
    pub use crate::retry::{
        AttemptFailure, AttemptResult, ErrorKind, EventLog, RecoveryRegistry, RetryEvent,
        RetryExecutor, RetryListener, RetryPolicy, Sleeper, TokioSleeper, TrackingSleeper,
    };
    pub use tokio_util::sync::CancellationToken;
}
