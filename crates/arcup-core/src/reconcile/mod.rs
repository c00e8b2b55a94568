//! Update reconciler: compare the installed artifact with the published one
//! and replace it when they differ.
//!
//! One run is strictly sequential: fetch the remote fingerprint, hash the
//! local file, download if they differ, then hash again to verify. A failed
//! remote fetch aborts before the local file is touched. A mismatch after
//! download is reported and left in place; it is never retried.

mod target;
mod write;

pub use target::ArtifactTarget;

use crate::config::{ArcupConfig, ConfigError, DEFAULT_CHUNK_SIZE};
use crate::error::UpdateError;
use crate::fingerprint::{self, Fingerprint, LocalState};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::transfer::{Transfer, TransferError};
use write::ArtifactWriter;

/// How a reconcile run ended, when it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Local fingerprint already matched; nothing downloaded.
    UpToDate,
    /// Downloaded and the new file matches the published fingerprint.
    Updated,
    /// Downloaded but the file on disk does not match. Fatal for the run.
    Mismatched {
        local: LocalState,
        remote: Fingerprint,
    },
}

impl Outcome {
    /// Turns a mismatch into `UpdateError::VerificationMismatch`.
    pub fn into_result(self) -> Result<Outcome, UpdateError> {
        match self {
            Outcome::Mismatched { local, remote } => {
                Err(UpdateError::VerificationMismatch { local, remote })
            }
            other => Ok(other),
        }
    }
}

/// Result of comparing without downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub local: LocalState,
    pub remote: Fingerprint,
}

impl CheckResult {
    pub fn is_up_to_date(&self) -> bool {
        self.local.matches(&self.remote)
    }
}

/// Reconciles one installed artifact against its published version.
///
/// Collaborators are passed in rather than held globally, so tests can
/// substitute the transfer client.
pub struct Reconciler<T> {
    transfer: T,
    target: ArtifactTarget,
    chunk_size: usize,
    staged_write: bool,
    retry: Option<RetryPolicy>,
}

impl<T: Transfer> Reconciler<T> {
    /// Reference behavior: in-place write, 64 KiB chunks, no retry.
    pub fn new(transfer: T, target: ArtifactTarget) -> Self {
        Self {
            transfer,
            target,
            chunk_size: DEFAULT_CHUNK_SIZE,
            staged_write: false,
            retry: None,
        }
    }

    pub fn from_config(transfer: T, cfg: &ArcupConfig) -> Result<Self, ConfigError> {
        let target = ArtifactTarget::from_config(cfg)?;
        Ok(Self::new(transfer, target)
            .with_chunk_size(cfg.advanced.chunk_size)
            .with_staged_write(cfg.advanced.staged_write)
            .with_retry(cfg.advanced.retry.as_ref().map(RetryPolicy::from_config)))
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_staged_write(mut self, staged: bool) -> Self {
        self.staged_write = staged;
        self
    }

    pub fn with_retry(mut self, retry: Option<RetryPolicy>) -> Self {
        self.retry = retry;
        self
    }

    pub fn target(&self) -> &ArtifactTarget {
        &self.target
    }

    fn with_retry_policy<R>(
        &self,
        mut f: impl FnMut() -> Result<R, TransferError>,
    ) -> Result<R, TransferError> {
        match &self.retry {
            Some(policy) => run_with_retry(policy, f),
            None => f(),
        }
    }

    /// Fetches `<base>/<artifact>.md5sum` and returns its first token.
    pub fn fetch_remote_fingerprint(&self) -> Result<Fingerprint, UpdateError> {
        let url = self.target.sidecar_url().as_str();
        let body = self
            .with_retry_policy(|| self.transfer.get_text(url))
            .map_err(|source| UpdateError::Transfer {
                url: url.to_string(),
                source,
            })?;
        let remote = fingerprint::parse_sidecar(&body).map_err(|source| UpdateError::Format {
            url: url.to_string(),
            source,
        })?;
        tracing::debug!("remote fingerprint {} from {}", remote, url);
        Ok(remote)
    }

    /// Hashes the installed file, read fresh from disk. A missing file is
    /// `LocalState::Absent` and logged as a first install.
    pub fn compute_local_fingerprint(&self) -> Result<LocalState, UpdateError> {
        let path = self.target.path();
        let state = fingerprint::local_state(path, fingerprint::BUF_SIZE)
            .map_err(|e| UpdateError::io("read", path, e))?;
        if state.is_absent() {
            tracing::warn!(
                "{} not found, installing for the first time",
                path.display()
            );
        }
        Ok(state)
    }

    /// Streams the artifact over the target path in bounded chunks. Returns
    /// bytes written.
    ///
    /// Unless staged writes are enabled, the previous file is truncated as
    /// soon as the first chunk arrives and is not backed up.
    pub fn download_artifact(&self) -> Result<u64, UpdateError> {
        let url = self.target.artifact_url().as_str();
        let path = self.target.path();
        let written = self
            .with_retry_policy(|| {
                let mut writer = ArtifactWriter::new(path, self.chunk_size, self.staged_write);
                self.transfer.download(url, &mut writer)?;
                writer.finish().map_err(TransferError::Sink)
            })
            .map_err(|e| match e {
                TransferError::Sink(source) => UpdateError::io("write", path, source),
                source => UpdateError::Transfer {
                    url: url.to_string(),
                    source,
                },
            })?;
        tracing::info!("wrote {} bytes to {}", written, path.display());
        Ok(written)
    }

    /// Compares local and remote fingerprints without downloading.
    pub fn check(&self) -> Result<CheckResult, UpdateError> {
        let remote = self.fetch_remote_fingerprint()?;
        let local = self.compute_local_fingerprint()?;
        Ok(CheckResult { local, remote })
    }

    /// Full run: fetch, compare, download when different, verify.
    ///
    /// `Err` means the run failed before verification (nothing downloaded if
    /// the remote fetch failed). `Ok(Outcome::Mismatched { .. })` means the
    /// download completed but the file does not match; it is logged at error
    /// level and left in place.
    pub fn reconcile(&self) -> Result<Outcome, UpdateError> {
        let CheckResult { local, remote } = self.check()?;
        if local.matches(&remote) {
            tracing::info!(
                "we are up to date, not replacing existing {}",
                self.target.path().display()
            );
            return Ok(Outcome::UpToDate);
        }

        tracing::info!("outdated (ours={}, theirs={}), updating", local, remote);
        self.download_artifact()?;
        tracing::info!("finished downloading, checking hash again");

        let local = self.compute_local_fingerprint()?;
        if local.matches(&remote) {
            tracing::info!("done! (ours={}, theirs={})", local, remote);
            Ok(Outcome::Updated)
        } else {
            tracing::error!("new hash does not match! ({} != {})", local, remote);
            Ok(Outcome::Mismatched { local, remote })
        }
    }
}
