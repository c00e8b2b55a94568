//! Core of `arcup`: keeps a single installed plugin binary in sync with the
//! build published at a remote URL.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod reconcile;
pub mod retry;
pub mod transfer;

pub use error::UpdateError;
pub use reconcile::{ArtifactTarget, CheckResult, Outcome, Reconciler};
