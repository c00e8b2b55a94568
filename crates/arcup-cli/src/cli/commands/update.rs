//! `arcup update` – reconcile the installed artifact with the published one.

use anyhow::{Context, Result};
use arcup_core::config;
use arcup_core::transfer::CurlTransfer;
use arcup_core::{Outcome, Reconciler};
use std::path::Path;

/// A post-download mismatch is returned as `UpdateError::VerificationMismatch`.
pub fn run_update(config_path: Option<&Path>) -> Result<()> {
    let (path, cfg) = config::load(config_path)?;
    tracing::debug!("loaded config from {}: {:?}", path.display(), cfg);

    let transfer = CurlTransfer::from_config(&cfg.advanced);
    let reconciler = Reconciler::from_config(transfer, &cfg)?;
    reconciler
        .reconcile()
        .and_then(Outcome::into_result)
        .with_context(|| format!("updating {}", reconciler.target().path().display()))?;
    Ok(())
}
