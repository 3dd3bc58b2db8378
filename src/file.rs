//! Low-level file primitives: blocking positioned reads and writes.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{DbfError, DbfResult};

/// Access mode for a table handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    /// Reads only; every mutation fails before touching the file.
    ReadOnly,
    /// Reads and writes.
    ReadWrite,
}

/// Wrapper around the table file handle.
///
/// All I/O is synchronous and blocking; every call seeks to an absolute byte
/// offset first, so sequential state of the underlying descriptor never
/// leaks into the engine.
#[derive(Debug)]
pub struct TableFile {
    file: File,
    path: PathBuf,
    mode: OpenMode,
}

impl TableFile {
    /// Open an existing table file in the given mode.
    pub fn open(path: &Path, mode: OpenMode) -> DbfResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(mode == OpenMode::ReadWrite)
            .open(path)
            .map_err(|e| DbfError::Open { source: e })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            mode,
        })
    }

    /// Return the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the access mode the file was opened with.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Returns true when the handle permits writes.
    pub fn is_writable(&self) -> bool {
        self.mode == OpenMode::ReadWrite
    }

    /// Read up to `buf.len()` bytes at `offset`, returning the count read.
    ///
    /// A count smaller than the buffer means the file ended early; callers
    /// decide whether that is a format error or a short-read failure.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> DbfResult<usize> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| DbfError::read("seek", e))?;
        let mut total = 0;
        while total < buf.len() {
            match self.file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DbfError::read("read", e)),
            }
        }
        Ok(total)
    }

    /// Write all of `data` at `offset`.
    ///
    /// Fails with a write error before any byte is touched when the handle
    /// is read-only.
    pub fn write_all_at(&mut self, action: &'static str, offset: u64, data: &[u8]) -> DbfResult<()> {
        if !self.is_writable() {
            return Err(DbfError::write(action, "handle is read-only"));
        }
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| DbfError::write(action, format!("seek failed: {}", e)))?;
        self.file
            .write_all(data)
            .map_err(|e| DbfError::write(action, format!("write failed: {}", e)))
    }

    /// Open an independent handle on the same path and mode.
    pub fn reopen(&self) -> DbfResult<Self> {
        Self::open(&self.path, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::tempdir;

    fn fixture(bytes: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.dbf");
        std::fs::File::create(&path).unwrap().write_all(bytes).unwrap();
        (dir, path)
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = TableFile::open(&dir.path().join("missing.dbf"), OpenMode::ReadOnly).unwrap_err();
        assert!(matches!(err, DbfError::Open { .. }));
    }

    #[test]
    fn read_at_reports_short_reads() {
        let (_dir, path) = fixture(b"abcdef");
        let mut file = TableFile::open(&path, OpenMode::ReadOnly).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(file.read_at(0, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");

        assert_eq!(file.read_at(4, &mut buf).unwrap(), 2);
        assert_eq!(file.read_at(100, &mut buf).unwrap(), 0);
    }

    #[test]
    fn write_rejected_on_read_only_handle() {
        let (_dir, path) = fixture(b"abcdef");
        let mut file = TableFile::open(&path, OpenMode::ReadOnly).unwrap();
        let err = file.write_all_at("test", 0, b"x").unwrap_err();
        assert!(matches!(err, DbfError::Write { .. }));

        // Nothing was touched.
        let mut buf = [0u8; 1];
        file.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"a");
    }

    #[test]
    fn write_then_read_back() {
        let (_dir, path) = fixture(b"abcdef");
        let mut file = TableFile::open(&path, OpenMode::ReadWrite).unwrap();
        file.write_all_at("test", 2, b"XY").unwrap();

        let mut buf = [0u8; 6];
        file.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"abXYef");
    }

    #[test]
    fn reopen_gives_independent_handle() {
        let (_dir, path) = fixture(b"abcdef");
        let file = TableFile::open(&path, OpenMode::ReadWrite).unwrap();
        let mut twin = file.reopen().unwrap();
        assert_eq!(twin.path(), file.path());
        assert_eq!(twin.mode(), OpenMode::ReadWrite);

        let mut buf = [0u8; 3];
        twin.read_at(3, &mut buf).unwrap();
        assert_eq!(&buf, b"def");
    }
}
