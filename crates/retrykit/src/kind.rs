//! Failure categories of the remote call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    /// The remote endpoint could not be reached.
    RemoteAccess,
    /// The remote endpoint did not answer in time.
    RemoteTimeout,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::RemoteAccess => f.write_str("RemoteAccess"),
            RemoteErrorKind::RemoteTimeout => f.write_str("RemoteTimeout"),
        }
    }
}
