//! libcurl-backed [`Transfer`] using one `Easy` handle per request.

use super::{Transfer, TransferError, DEFAULT_USER_AGENT};
use crate::config::AdvancedConfig;
use curl::easy::Easy;
use std::cell::Cell;
use std::io::{self, Write};
use std::time::Duration;

/// Blocking GET client. Every request carries the configured `User-Agent`.
#[derive(Debug, Clone)]
pub struct CurlTransfer {
    user_agent: String,
    connect_timeout: Option<Duration>,
    timeout: Option<Duration>,
}

impl Default for CurlTransfer {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

impl CurlTransfer {
    /// Client with libcurl's default timeouts.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            connect_timeout: None,
            timeout: None,
        }
    }

    pub fn from_config(advanced: &AdvancedConfig) -> Self {
        Self {
            user_agent: advanced.user_agent.clone(),
            connect_timeout: advanced.connect_timeout_secs.map(Duration::from_secs),
            timeout: advanced.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn handle(&self, url: &str) -> Result<Easy, curl::Error> {
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.useragent(&self.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        // Error statuses must not reach the sink, or an error page would
        // overwrite the installed artifact. libcurl still delivers 401/407
        // bodies here, so `get` also drops bodies of non-2xx responses.
        easy.fail_on_error(true)?;
        if let Some(t) = self.connect_timeout {
            easy.connect_timeout(t)?;
        }
        if let Some(t) = self.timeout {
            easy.timeout(t)?;
        }
        Ok(easy)
    }

    /// Performs a GET and feeds each received chunk to `on_data`.
    fn get(
        &self,
        url: &str,
        on_data: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<u64, TransferError> {
        let mut easy = self.handle(url)?;
        let mut received = 0u64;
        let mut sink_err: Option<io::Error> = None;
        let status = Cell::new(0u32);

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| {
                if let Some(code) = parse_status_line(line) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| {
                let code = status.get();
                if code != 0 && !(200..300).contains(&code) {
                    // Body of an error response: drain it, status is checked below.
                    return Ok(data.len());
                }
                match on_data(data) {
                    Ok(()) => {
                        received += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        sink_err = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = sink_err {
            return Err(TransferError::Sink(e));
        }
        match performed {
            Ok(()) => {}
            Err(e) if e.is_http_returned_error() => {
                return Err(TransferError::Http(easy.response_code()?));
            }
            Err(e) => return Err(TransferError::Curl(e)),
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }
        tracing::debug!("GET {} -> HTTP {} ({} bytes)", url, code, received);
        Ok(received)
    }
}

/// Status code from an HTTP status line (`HTTP/1.1 200 OK`, `HTTP/2 401`).
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    let mut parts = line.split_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

impl Transfer for CurlTransfer {
    fn get_text(&self, url: &str) -> Result<String, TransferError> {
        let mut body = Vec::new();
        self.get(url, &mut |data| {
            body.extend_from_slice(data);
            Ok(())
        })?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransferError> {
        self.get(url, &mut |data| sink.write_all(data))
    }
}
