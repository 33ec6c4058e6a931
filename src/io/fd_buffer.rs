//! Userspace buffering over a duplicated descriptor
//!
//! `FdBuffer` owns a duplicate of a caller's descriptor together with the
//! buffer used for it, so both are released together. It behaves like a
//! stdio `FILE` opened with full buffering: one buffer serves either reads
//! or writes at any time, and switching direction or seeking drains it.

use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::os::fd::{BorrowedFd, OwnedFd};

use log::{trace, warn};

/// Buffer size used when the caller does not supply one
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Buffered stream over an owned duplicate descriptor
pub struct FdBuffer {
    file: File,
    buf: Box<[u8]>,
    /// Read window: `buf[pos..filled]` holds data not yet handed out
    pos: usize,
    filled: usize,
    /// Pending write data: `buf[..pending]`
    pending: usize,
    /// Logical position, kept up to date even when the device cannot tell
    position: u64,
}

impl FdBuffer {
    /// Duplicates `fd` and wraps the duplicate
    ///
    /// A `buffer_size` of 0 selects `DEFAULT_BUFFER_SIZE`.
    pub fn from_borrowed(fd: BorrowedFd<'_>, buffer_size: usize) -> io::Result<Self> {
        let duplicate = fd.try_clone_to_owned()?;
        Ok(Self::new(duplicate, buffer_size))
    }

    /// Wraps an already owned descriptor
    pub fn new(fd: OwnedFd, buffer_size: usize) -> Self {
        let capacity = if buffer_size == 0 { DEFAULT_BUFFER_SIZE } else { buffer_size };
        FdBuffer {
            file: File::from(fd),
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            filled: 0,
            pending: 0,
            position: 0,
        }
    }

    /// Size of the allocated buffer
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Logical position as counted by this buffer
    pub fn position(&self) -> u64 {
        self.position
    }

    fn unread(&self) -> usize {
        self.filled - self.pos
    }

    fn discard_read_window(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }

    /// Writes out pending data without flushing the device
    fn drain_writes(&mut self) -> io::Result<()> {
        if self.pending > 0 {
            let pending = self.pending;
            self.pending = 0;
            self.file.write_all(&self.buf[..pending])?;
        }
        Ok(())
    }

    /// Gives back read-ahead data so the OS offset matches the logical one
    ///
    /// Returns false when the device cannot seek. The read window is then
    /// kept, and later reads still hand it out.
    fn release_read_window(&mut self) -> bool {
        let unread = self.unread();
        if unread > 0 {
            if let Err(e) = self.file.seek(SeekFrom::Current(-(unread as i64))) {
                trace!("Keeping {} read-ahead bytes: {}", unread, e);
                return false;
            }
        }
        self.discard_read_window();
        true
    }

    /// Reads until `out` is full, end of stream or an error
    ///
    /// Returns the bytes delivered and the error that stopped the read, if
    /// any. Bytes delivered before an error are kept.
    pub fn read(&mut self, out: &mut [u8]) -> (usize, Option<io::Error>) {
        if let Err(e) = self.drain_writes() {
            return (0, Some(e));
        }

        let mut done = 0;
        let mut error = None;
        while done < out.len() {
            if self.pos < self.filled {
                let n = (self.filled - self.pos).min(out.len() - done);
                out[done..done + n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
                self.pos += n;
                done += n;
                continue;
            }

            // Large requests bypass the buffer.
            let direct = out.len() - done >= self.buf.len();
            let result = if direct {
                self.file.read(&mut out[done..])
            } else {
                self.file.read(&mut self.buf)
            };

            match result {
                Ok(0) => break,
                Ok(n) if direct => done += n,
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }

        self.position += done as u64;
        (done, error)
    }

    /// Writes all of `data`, buffering what fits
    ///
    /// While unread data occupies the buffer (a socket read ahead of the
    /// caller), writes go straight to the device.
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        if !self.release_read_window() {
            self.file.write_all(data)?;
            self.position += data.len() as u64;
            return Ok(());
        }

        if self.pending + data.len() > self.buf.len() {
            self.drain_writes()?;
        }
        if data.len() >= self.buf.len() {
            self.file.write_all(data)?;
        } else {
            self.buf[self.pending..self.pending + data.len()].copy_from_slice(data);
            self.pending += data.len();
        }

        self.position += data.len() as u64;
        Ok(())
    }

    /// Pushes pending writes to the device
    pub fn flush(&mut self) -> io::Result<()> {
        self.drain_writes()?;
        self.file.flush()
    }

    /// Repositions the stream
    ///
    /// Pending writes are written first. Read-ahead data is only dropped
    /// once the device accepted the new position, so a failed seek on a
    /// pipe loses nothing.
    pub fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        self.drain_writes()?;
        let target = match target {
            SeekFrom::Current(offset) => {
                let adjusted = offset
                    .checked_sub(self.unread() as i64)
                    .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "seek offset out of range"))?;
                SeekFrom::Current(adjusted)
            }
            other => other,
        };
        let new_position = self.file.seek(target)?;
        self.discard_read_window();
        self.position = new_position;
        Ok(new_position)
    }

    /// Writes pending data, drops read-ahead and rewinds to offset 0
    ///
    /// The rewind itself is best effort: on a device that cannot seek only
    /// the buffered state is reset.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.drain_writes()?;
        self.discard_read_window();
        match self.file.rewind() {
            Ok(()) => self.position = 0,
            Err(e) => trace!("Rewind not possible: {}", e),
        }
        Ok(())
    }
}

impl Drop for FdBuffer {
    fn drop(&mut self) {
        if let Err(e) = self.drain_writes() {
            warn!("Discarding buffered data on close: {}", e);
        }
    }
}
