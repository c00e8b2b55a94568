//! Destination sink for the downloaded artifact.
//!
//! The target is opened lazily on the first received chunk, so a request that
//! fails before any body arrives leaves the installed file untouched. Writes
//! go out in slices of at most `chunk_size` bytes.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

enum Sink {
    /// Target truncated and written in place.
    Direct(File),
    /// Temp file in the target's directory, renamed over the target on finish.
    Staged(NamedTempFile),
}

pub(crate) struct ArtifactWriter {
    target: PathBuf,
    chunk_size: usize,
    staged: bool,
    sink: Option<Sink>,
    written: u64,
}

impl ArtifactWriter {
    pub(crate) fn new(target: &Path, chunk_size: usize, staged: bool) -> Self {
        Self {
            target: target.to_path_buf(),
            chunk_size: chunk_size.max(1),
            staged,
            sink: None,
            written: 0,
        }
    }

    fn open(&self) -> io::Result<Sink> {
        if self.staged {
            let dir = match self.target.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let tmp = tempfile::Builder::new()
                .prefix(".arcup-")
                .suffix(".part")
                .tempfile_in(dir)?;
            Ok(Sink::Staged(tmp))
        } else {
            File::create(&self.target).map(Sink::Direct)
        }
    }

    fn file(&mut self) -> io::Result<&mut File> {
        let sink = match self.sink.take() {
            Some(s) => s,
            None => self.open()?,
        };
        Ok(match self.sink.insert(sink) {
            Sink::Direct(f) => f,
            Sink::Staged(t) => t.as_file_mut(),
        })
    }

    /// Flushes and syncs, then (in staged mode) renames the temp file over the
    /// target. An empty body still produces an empty target file.
    /// Returns bytes written.
    pub(crate) fn finish(mut self) -> io::Result<u64> {
        let file = self.file()?;
        file.flush()?;
        file.sync_all()?;
        match self.sink.take() {
            Some(Sink::Staged(tmp)) => {
                tmp.persist(&self.target).map_err(|e| e.error)?;
            }
            Some(Sink::Direct(_)) | None => {}
        }
        Ok(self.written)
    }
}

impl Write for ArtifactWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk_size);
        self.file()?.write_all(&buf[..n])?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.sink.as_mut() {
            Some(Sink::Direct(f)) => f.flush(),
            Some(Sink::Staged(t)) => t.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_are_bounded_by_chunk_size() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("d3d11.dll");
        let mut w = ArtifactWriter::new(&target, 4, false);
        assert_eq!(w.write(b"0123456789").unwrap(), 4);
        w.write_all(b"456789").unwrap();
        assert_eq!(w.finish().unwrap(), 10);
        assert_eq!(fs::read(&target).unwrap(), b"0123456789");
    }

    #[test]
    fn target_untouched_until_first_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("d3d11.dll");
        fs::write(&target, b"old build").unwrap();
        let w = ArtifactWriter::new(&target, 64, false);
        drop(w);
        assert_eq!(fs::read(&target).unwrap(), b"old build");
    }

    #[test]
    fn direct_write_truncates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("d3d11.dll");
        fs::write(&target, b"a much longer old build").unwrap();
        let mut w = ArtifactWriter::new(&target, 64, false);
        w.write_all(b"new").unwrap();
        w.finish().unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn empty_body_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("d3d11.dll");
        fs::write(&target, b"old").unwrap();
        let w = ArtifactWriter::new(&target, 64, false);
        assert_eq!(w.finish().unwrap(), 0);
        assert_eq!(fs::read(&target).unwrap(), b"");
    }

    #[test]
    fn staged_write_renames_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("d3d11.dll");
        fs::write(&target, b"old").unwrap();
        let mut w = ArtifactWriter::new(&target, 2, true);
        w.write_all(b"staged build").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"old");
        w.finish().unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"staged build");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp file must not be left behind");
    }

    #[test]
    fn missing_directory_fails_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("d3d11.dll");
        let mut w = ArtifactWriter::new(&target, 64, false);
        let err = w.write_all(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
