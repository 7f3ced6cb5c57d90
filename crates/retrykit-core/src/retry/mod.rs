//! Bounded retry with exponential backoff and per-kind recovery.
//!
//! # Key Types
//!
//! - [`RetryPolicy`] - which kinds to retry, attempt budget, delay schedule
//! - [`RecoveryRegistry`] - fallback functions keyed by error kind
//! - [`RetryExecutor`] - runs an operation under a policy and registry
//! - [`Sleeper`] - suspension between attempts
//! - [`RetryListener`] - observation of attempts and recovery
//!
//! # Examples
//!
//! ```rust
//! use retrykit_core::retry::{AttemptFailure, RecoveryRegistry, RetryPolicy, execute};
//! use std::time::Duration;
//!
//! # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! # enum Kind { RemoteAccess }
//! # impl std::fmt::Display for Kind {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{self:?}") }
//! # }
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::builder()
//!     .include([Kind::RemoteAccess])
//!     .initial_delay(Duration::from_millis(1))
//!     .build()
//!     .unwrap();
//! let registry = RecoveryRegistry::builder()
//!     .recover(Kind::RemoteAccess, |_| 0)
//!     .build();
//!
//! let value = execute(
//!     || async { Err(AttemptFailure::new(Kind::RemoteAccess, "refused")) },
//!     &policy,
//!     &registry,
//! )
//! .await
//! .unwrap();
//! assert_eq!(value, 0);
//! # });
//! ```

mod attempt;
mod executor;
mod listener;
mod policy;
mod recovery;
mod sleeper;

pub use attempt::{AttemptFailure, AttemptResult, ErrorKind};
pub use executor::{RetryExecutor, RetryExecutorBuilder, execute};
#[cfg(feature = "tracing")]
pub use listener::TracingListener;
pub use listener::{EventLog, RetryEvent, RetryListener};
pub use policy::{RetryPolicy, RetryPolicyBuilder};
pub(crate) use policy::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MULTIPLIER};
pub use recovery::{RecoveryFn, RecoveryRegistry, RecoveryRegistryBuilder};
pub use sleeper::{Sleeper, TokioSleeper, TrackingSleeper};
