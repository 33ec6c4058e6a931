//! Byte stream capability interface
//!
//! This module defines the trait a typed serialization layer talks to.
//! Implementations decide themselves whether they can read, write or seek;
//! callers query the capabilities instead of assuming them.

use std::io::SeekFrom;

use crate::io::errors::{StreamError, StreamResult};

/// Origin of a seek operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOption {
    /// Offset is relative to the start of the stream
    FromStart,
    /// Offset is relative to the current position
    FromCurrent,
    /// Offset is relative to the end of the stream
    FromEnd,
}

impl SeekOption {
    /// Converts an offset with this origin into a `SeekFrom`
    ///
    /// A negative offset from the start cannot be represented and is
    /// reported as an `InvalidInput` I/O error.
    pub fn to_seek_from(self, offset: i64) -> std::io::Result<SeekFrom> {
        match self {
            SeekOption::FromStart => u64::try_from(offset).map(SeekFrom::Start).map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("negative offset {} from start of stream", offset),
                )
            }),
            SeekOption::FromCurrent => Ok(SeekFrom::Current(offset)),
            SeekOption::FromEnd => Ok(SeekFrom::End(offset)),
        }
    }
}

/// Readable/writable/seekable flags of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub readable: bool,
    pub writable: bool,
    pub seekable: bool,
}

/// Trait for byte-granular streams
///
/// This is the only interface the upper layers use to move bytes, so it
/// must behave the same whether the device is a regular file, a pipe or
/// a socket.
pub trait ByteStream {
    /// Write all bytes of `buf`
    fn write(&mut self, buf: &[u8]) -> StreamResult<()>;

    /// Read up to `buf.len()` bytes and return the number actually read
    ///
    /// With `throw_on_short_read` set, a read that delivers fewer bytes
    /// than requested fails with `StreamError::ShortRead`.
    fn read(&mut self, buf: &mut [u8], throw_on_short_read: bool) -> StreamResult<usize>;

    /// Reposition the stream and return the new absolute position
    fn seek(&mut self, offset: i64, option: SeekOption) -> StreamResult<u64>;

    /// Length of the stream in bytes
    fn length(&mut self) -> StreamResult<u64>;

    /// Push buffered data to the device
    fn flush(&mut self) -> StreamResult<()>;

    /// Drop buffered state and reposition to the start of the stream
    fn resync(&mut self) -> StreamResult<()>;

    fn is_readable(&self) -> bool;

    fn is_writable(&self) -> bool;

    fn is_seekable(&self) -> bool;

    /// Display name of the stream, empty when none was assigned
    fn file_name(&self) -> &str;

    /// Current position
    fn tell(&mut self) -> StreamResult<u64> {
        self.seek(0, SeekOption::FromCurrent)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            readable: self.is_readable(),
            writable: self.is_writable(),
            seekable: self.is_seekable(),
        }
    }

    /// Read at an absolute offset
    fn pread(&mut self, offset: u64, buf: &mut [u8], throw_on_short_read: bool) -> StreamResult<usize> {
        let offset = offset_to_i64(offset, self.file_name())?;
        self.seek(offset, SeekOption::FromStart)?;
        self.read(buf, throw_on_short_read)
    }

    /// Write at an absolute offset
    fn pwrite(&mut self, offset: u64, buf: &[u8]) -> StreamResult<()> {
        let offset = offset_to_i64(offset, self.file_name())?;
        self.seek(offset, SeekOption::FromStart)?;
        self.write(buf)
    }
}

fn offset_to_i64(offset: u64, name: &str) -> StreamResult<i64> {
    i64::try_from(offset).map_err(|_| StreamError::SeekFailure {
        name: name.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("offset {} out of range", offset),
        ),
    })
}
