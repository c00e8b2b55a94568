//! HTTP GET client used by the reconciler.
//!
//! The reconciler only depends on the [`Transfer`] trait; [`CurlTransfer`]
//! is the libcurl-backed implementation used by the CLI.

mod easy;

pub use easy::CurlTransfer;

use std::fmt;
use std::io::{self, Write};

/// Identifier sent as `User-Agent` unless the config overrides it.
pub const DEFAULT_USER_AGENT: &str = "ArcDPS AutoUpdate v0";

/// A blocking HTTP GET client.
pub trait Transfer {
    /// Fetches `url` and returns the body as text.
    fn get_text(&self, url: &str) -> Result<String, TransferError>;

    /// Streams the body of `url` into `sink` as it arrives. Returns bytes received.
    /// Nothing is written to `sink` when the server answers with an error status.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransferError>;
}

impl<T: Transfer + ?Sized> Transfer for &T {
    fn get_text(&self, url: &str) -> Result<String, TransferError> {
        (**self).get_text(url)
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransferError> {
        (**self).download(url, sink)
    }
}

/// Failure of a single GET. Kept separate from anyhow so the retry policy can
/// classify it.
#[derive(Debug)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, DNS, ...).
    Curl(curl::Error),
    /// Server answered with a non-2xx status.
    Http(u32),
    /// Writing the received body to the local sink failed. Not retried.
    Sink(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Curl(e) => write!(f, "{}", e),
            TransferError::Http(code) => write!(f, "HTTP {}", code),
            TransferError::Sink(e) => write!(f, "write: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Curl(e) => Some(e),
            TransferError::Sink(e) => Some(e),
            TransferError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for TransferError {
    fn from(e: curl::Error) -> Self {
        TransferError::Curl(e)
    }
}
