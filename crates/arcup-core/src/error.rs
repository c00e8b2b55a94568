//! Errors that end an update run.

use crate::fingerprint::{Fingerprint, LocalState, SidecarError};
use crate::transfer::TransferError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Every variant is terminal for the run; none is retried by the reconciler
/// itself (transfer retries happen below it, when configured).
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Request failed or returned a non-success status.
    #[error("GET {url} failed: {source}")]
    Transfer {
        url: String,
        #[source]
        source: TransferError,
    },
    /// The checksum sidecar was empty or unparsable.
    #[error("unusable checksum from {url}: {source}")]
    Format {
        url: String,
        #[source]
        source: SidecarError,
    },
    /// Local read or write failure other than the target being absent.
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file on disk after downloading does not hash to the published digest.
    #[error("new hash does not match! ({local} != {remote})")]
    VerificationMismatch {
        local: LocalState,
        remote: Fingerprint,
    },
}

impl UpdateError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        UpdateError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
