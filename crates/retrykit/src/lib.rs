#![deny(unsafe_code)]
#![warn(missing_docs)]

//! A remote call that retries with exponential backoff and recovers per
//! error kind.
//!
//! The call always times out. With the default policy it is attempted three
//! times, waiting 5s and then 10s between attempts, before the
//! `RemoteTimeout` recovery answers `"ok"`.
//!
//! ```no_run
//! use retrykit::RetryService;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = RetryService::new()?;
//! assert_eq!(service.call().await?, "ok");
//! # Ok(())
//! # }
//! ```

pub mod kind;
pub mod service;

pub use kind::RemoteErrorKind;
pub use service::RetryService;
