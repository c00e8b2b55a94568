//! `arcup check` – report whether the installed artifact is current.

use anyhow::Result;
use arcup_core::config;
use arcup_core::transfer::CurlTransfer;
use arcup_core::Reconciler;
use std::path::Path;

pub fn run_check(config_path: Option<&Path>) -> Result<()> {
    let (_, cfg) = config::load(config_path)?;
    let reconciler = Reconciler::from_config(CurlTransfer::from_config(&cfg.advanced), &cfg)?;
    let check = reconciler.check()?;
    let status = if check.is_up_to_date() {
        "up to date"
    } else {
        "outdated"
    };
    println!(
        "{}: {} (installed={}, published={})",
        reconciler.target().path().display(),
        status,
        check.local,
        check.remote
    );
    Ok(())
}
