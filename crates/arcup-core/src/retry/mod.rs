//! Opt-in retry and backoff for transfers.
//!
//! Classifies transfer failures (timeouts, throttling, connection errors, 5xx)
//! and decides capped exponential backoff. The reconciler only retries when a
//! `[advanced.retry]` section is configured; verification mismatches are never
//! retried.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
