//! MD5 fingerprints of the installed artifact and of the published sidecar.
//!
//! The local file is hashed in bounded chunks so memory use does not depend on
//! the artifact size. Fingerprints are normalized to lowercase hex on
//! construction, which makes comparison case-insensitive.

use md5::{Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

/// Default read buffer for hashing.
pub const BUF_SIZE: usize = 64 * 1024;

const MD5_HEX_LEN: usize = 32;

/// A hex-encoded MD5 digest, always stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parses a hex digest in either case. Returns `None` unless the input is
    /// exactly 32 hex digits (surrounding whitespace is ignored).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != MD5_HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What is currently installed at the target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalState {
    /// No file at the target path.
    Absent,
    /// File present with the given content fingerprint.
    Present(Fingerprint),
}

impl LocalState {
    /// True only when a file is present and its fingerprint equals `remote`.
    /// An absent file never matches.
    pub fn matches(&self, remote: &Fingerprint) -> bool {
        match self {
            LocalState::Absent => false,
            LocalState::Present(fp) => fp == remote,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, LocalState::Absent)
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            LocalState::Absent => None,
            LocalState::Present(fp) => Some(fp),
        }
    }
}

impl fmt::Display for LocalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalState::Absent => f.write_str("absent"),
            LocalState::Present(fp) => fp.fmt(f),
        }
    }
}

/// Why a `.md5sum` sidecar body could not be turned into a fingerprint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SidecarError {
    #[error("checksum body is empty")]
    Empty,
    #[error("first token {0:?} is not an MD5 hex digest")]
    NotHex(String),
}

/// Extracts the digest from a sidecar body in `md5sum` output format
/// (`<digest>  <name>`): the first whitespace-separated token.
pub fn parse_sidecar(body: &str) -> Result<Fingerprint, SidecarError> {
    let token = body.split_whitespace().next().ok_or(SidecarError::Empty)?;
    Fingerprint::parse(token).ok_or_else(|| SidecarError::NotHex(token.to_string()))
}

/// MD5 of an in-memory buffer.
pub fn md5_bytes(data: &[u8]) -> Fingerprint {
    Fingerprint(hex::encode(Md5::digest(data)))
}

/// Streams `reader` through MD5 using a buffer of `buf_size` bytes.
pub fn md5_reader<R: Read>(mut reader: R, buf_size: usize) -> io::Result<Fingerprint> {
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; buf_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint(hex::encode(hasher.finalize())))
}

/// Reads the state of the file at `path` fresh from disk.
///
/// A missing file is `Ok(LocalState::Absent)`; any other open or read failure
/// (permission denied, path is a directory, ...) is returned as an error.
pub fn local_state(path: &Path, buf_size: usize) -> io::Result<LocalState> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LocalState::Absent),
        Err(e) => return Err(e),
    };
    md5_reader(file, buf_size).map(LocalState::Present)
}
