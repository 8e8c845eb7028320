//! File handles: a cursor over a buffered copy of one file's content.

use std::fmt;
use std::io::{self, SeekFrom};

use tracing::{trace, warn};

use crate::error::{FsError, FsResult};
use crate::path::ResolvedPath;
use crate::types::OpenMode;

use super::fs::MemoryFileSystem;

pub const LINE_TERMINATOR: u8 = b'\n';

/// What a [`FileHandle`] holds on to while it is open.
///
/// Read-only handles only need shared access. Write-capable handles need
/// [`fs_mut`](Self::fs_mut) to return the tree so they can commit.
pub trait FsAccess {
    fn fs(&self) -> &MemoryFileSystem;

    /// `None` for shared access.
    fn fs_mut(&mut self) -> Option<&mut MemoryFileSystem>;
}

impl FsAccess for &mut MemoryFileSystem {
    fn fs(&self) -> &MemoryFileSystem {
        &**self
    }

    fn fs_mut(&mut self) -> Option<&mut MemoryFileSystem> {
        Some(&mut **self)
    }
}

impl FsAccess for &MemoryFileSystem {
    fn fs(&self) -> &MemoryFileSystem {
        self
    }

    fn fs_mut(&mut self) -> Option<&mut MemoryFileSystem> {
        None
    }
}

/// An open file.
///
/// The handle keeps the filesystem borrowed or locked through `F` until it is
/// dropped: shared for read-only modes, exclusive for everything else. Reads
/// and writes work on a buffer taken at open time; write-capable handles
/// commit that buffer back to the file on [`flush`](Self::flush),
/// [`close`](Self::close) or drop.
pub struct FileHandle<F>
where
    F: FsAccess,
{
    fs: F,
    path: ResolvedPath,
    mode: OpenMode,
    buffer: Vec<u8>,
    cursor: usize,
    closed: bool,
}

impl<F> FileHandle<F>
where
    F: FsAccess,
{
    pub(crate) fn new(fs: F, path: ResolvedPath, mode: OpenMode, buffer: Vec<u8>) -> Self {
        let cursor = if mode == OpenMode::Append {
            buffer.len()
        } else {
            0
        };
        trace!(path = %path, mode = %mode, "open");
        Self {
            fs,
            path,
            mode,
            buffer,
            cursor,
            closed: false,
        }
    }

    pub fn path(&self) -> String {
        self.path.to_string()
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> FsResult<()> {
        if self.closed {
            return Err(FsError::HandleClosed);
        }
        Ok(())
    }

    fn ensure_readable(&self) -> FsResult<()> {
        self.ensure_open()?;
        if !self.mode.is_readable() {
            return Err(FsError::UnsupportedOperation(format!("reading ({})", self.mode)));
        }
        Ok(())
    }

    fn ensure_writable(&self) -> FsResult<()> {
        self.ensure_open()?;
        if !self.mode.is_writable() {
            return Err(FsError::UnsupportedOperation(format!("writing ({})", self.mode)));
        }
        Ok(())
    }

    /// Read up to `count` bytes from the cursor. Returns fewer at the end of
    /// the content and an empty buffer past it.
    pub fn read(&mut self, count: usize) -> FsResult<Vec<u8>> {
        self.ensure_readable()?;
        let start = self.cursor.min(self.buffer.len());
        let end = start.saturating_add(count).min(self.buffer.len());
        self.cursor = self.cursor.max(end);
        Ok(self.buffer[start..end].to_vec())
    }

    pub fn read_to_end(&mut self) -> FsResult<Vec<u8>> {
        self.read(usize::MAX)
    }

    pub fn read_to_string(&mut self) -> FsResult<String> {
        String::from_utf8(self.read_to_end()?).map_err(|e| FsError::InvalidData(e.to_string()))
    }

    /// Read through the next line terminator, which is kept. Empty at the end.
    pub fn readline(&mut self) -> FsResult<Vec<u8>> {
        self.ensure_readable()?;
        let start = self.cursor.min(self.buffer.len());
        let end = match self.buffer[start..]
            .iter()
            .position(|&b| b == LINE_TERMINATOR)
        {
            Some(offset) => start + offset + 1,
            None => self.buffer.len(),
        };
        self.cursor = self.cursor.max(end);
        Ok(self.buffer[start..end].to_vec())
    }

    /// Iterate over the remaining lines, continuing from the cursor.
    pub fn lines(&mut self) -> Lines<'_, F> {
        Lines {
            handle: self,
            done: false,
        }
    }

    /// Write at the cursor, overwriting and extending as needed. Append-mode
    /// handles always write at the end.
    pub fn write(&mut self, data: &[u8]) -> FsResult<usize> {
        self.ensure_writable()?;
        if self.mode == OpenMode::Append {
            self.cursor = self.buffer.len();
        }
        if data.is_empty() {
            return Ok(0);
        }

        let end = self.cursor.checked_add(data.len()).ok_or(FsError::BadOffset)?;
        if end > self.buffer.len() {
            self.fs.fs().config().check_file_size(end, &self.path.to_string())?;
            self.buffer
                .try_reserve(end - self.buffer.len())
                .map_err(|e| FsError::QuotaExceeded(format!("{}: {}", self.path, e)))?;
            // Gap after a seek past the end reads back as zeros.
            self.buffer.resize(end, 0);
        }
        self.buffer[self.cursor..end].copy_from_slice(data);
        self.cursor = end;
        trace!(path = %self.path, bytes = data.len(), "write");
        Ok(data.len())
    }

    pub fn write_str(&mut self, text: &str) -> FsResult<usize> {
        self.write(text.as_bytes())
    }

    /// Move the cursor. Positions past the end are allowed; before the start
    /// fails with `BadOffset`.
    pub fn seek(&mut self, pos: SeekFrom) -> FsResult<u64> {
        self.ensure_open()?;
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => (self.buffer.len() as u64).checked_add_signed(delta),
            SeekFrom::Current(delta) => (self.cursor as u64).checked_add_signed(delta),
        }
        .ok_or(FsError::BadOffset)?;
        self.cursor = usize::try_from(target).map_err(|_| FsError::BadOffset)?;
        Ok(target)
    }

    pub fn tell(&self) -> FsResult<u64> {
        self.ensure_open()?;
        Ok(self.cursor as u64)
    }

    /// Commit buffered content without closing.
    pub fn flush(&mut self) -> FsResult<()> {
        self.ensure_open()?;
        if self.mode.is_writable() {
            self.commit(self.buffer.clone())?;
        }
        Ok(())
    }

    /// Commit buffered content and close. Closing twice is a no-op.
    pub fn close(&mut self) -> FsResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.mode.is_writable() {
            let data = std::mem::take(&mut self.buffer);
            self.commit(data)?;
        }
        trace!(path = %self.path, "close");
        Ok(())
    }

    fn commit(&mut self, data: Vec<u8>) -> FsResult<()> {
        let mode = self.mode;
        let fs = self
            .fs
            .fs_mut()
            .ok_or_else(|| FsError::UnsupportedOperation(format!("writing ({})", mode)))?;
        fs.commit_file(&self.path, data)
    }
}

impl<F> Drop for FileHandle<F>
where
    F: FsAccess,
{
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path, error = %e, "failed to commit file on drop");
        }
    }
}

impl<F> fmt::Debug for FileHandle<F>
where
    F: FsAccess,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path.to_string())
            .field("mode", &self.mode)
            .field("cursor", &self.cursor)
            .field("len", &self.buffer.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl<F> io::Read for FileHandle<F>
where
    F: FsAccess,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = FileHandle::read(self, buf.len())?;
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}

impl<F> io::Write for FileHandle<F>
where
    F: FsAccess,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(FileHandle::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(FileHandle::flush(self)?)
    }
}

impl<F> io::Seek for FileHandle<F>
where
    F: FsAccess,
{
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(FileHandle::seek(self, pos)?)
    }
}

/// Lines left in a handle, terminators included. Consumes the handle's
/// cursor, so it cannot be restarted.
pub struct Lines<'h, F>
where
    F: FsAccess,
{
    handle: &'h mut FileHandle<F>,
    done: bool,
}

impl<F> Iterator for Lines<'_, F>
where
    F: FsAccess,
{
    type Item = FsResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.handle.readline() {
            Ok(line) if line.is_empty() => {
                self.done = true;
                None
            }
            Ok(line) => Some(Ok(line)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
