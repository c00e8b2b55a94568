//! `arcup hash` – print the MD5 fingerprint of a file.

use anyhow::{Context, Result};
use arcup_core::fingerprint::{self, LocalState};
use std::path::Path;

pub fn run_hash(path: &Path) -> Result<()> {
    let state = fingerprint::local_state(path, fingerprint::BUF_SIZE)
        .with_context(|| format!("read {}", path.display()))?;
    match state {
        LocalState::Present(fp) => {
            println!("{}  {}", fp, path.display());
            Ok(())
        }
        LocalState::Absent => anyhow::bail!("{} does not exist", path.display()),
    }
}
