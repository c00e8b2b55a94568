//! Logging init: timestamped lines on stderr, optionally mirrored to
//! `~/.local/state/arcup/arcup.log`.

use anyhow::Result;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,arcup=debug,arcup_core=debug";

/// Writes every line to stderr and, when present, to the log file as well.
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().lock().write_all(buf)?;
        if let Some(f) = self.file.as_mut() {
            f.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().lock().flush()?;
        if let Some(f) = self.file.as_mut() {
            f.flush()?;
        }
        Ok(())
    }
}

struct TeeMakeWriter(Option<File>);

impl<'a> MakeWriter<'a> for TeeMakeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        // Clone failure only loses the file copy of this line.
        TeeWriter {
            file: self.0.as_ref().and_then(|f| f.try_clone().ok()),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Location of the mirrored log file under the XDG state dir.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("arcup")?;
    Ok(xdg_dirs.get_state_home().join("arcup.log"))
}

fn open_log_file() -> Result<(File, PathBuf)> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    Ok((file, path))
}

/// Initialize structured logging to stderr. With `mirror_to_file`, lines are
/// also appended to the XDG state log. On failure (e.g. state dir unwritable)
/// nothing is installed and the caller can fall back to `init_logging_stderr`.
pub fn init_logging(mirror_to_file: bool) -> Result<()> {
    let (file, path) = if mirror_to_file {
        let (file, path) = open_log_file()?;
        (Some(file), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(TeeMakeWriter(file)))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    if let Some(path) = path {
        tracing::debug!("arcup logging mirrored to {}", path.display());
    }
    Ok(())
}

/// Initialize logging to stderr only. Use when `init_logging` fails so the CLI doesn't crash.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
