//! Buffered byte stream over an open file descriptor
//!
//! `FilebufStream` hooks any descriptor (a regular file, a pipe or a socket)
//! into the `ByteStream` interface. The descriptor has to be opened
//! beforehand; attaching determines whether it is readable, writable and
//! seekable.
//!
//! The stream works on its own duplicate of the descriptor, so the
//! caller's descriptor stays open when the stream goes away unless
//! ownership was handed over explicitly.
//!
//! ```no_run
//! use std::os::fd::AsFd;
//! use fdstream::io::{ByteStream, FilebufStream};
//!
//! let file = std::fs::File::open("data.bin")?;
//! let mut stream = FilebufStream::open(file.as_fd(), 0)?;
//! let mut header = [0u8; 8];
//! stream.read(&mut header, true)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{self, SeekFrom};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};

use log::{debug, warn};

use crate::io::access_mode::AccessMode;
use crate::io::byte_stream::{ByteStream, SeekOption};
use crate::io::errors::{StreamError, StreamResult};
use crate::io::fd_buffer::FdBuffer;

/// Options applied when attaching a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Size of the explicitly allocated buffer, 0 for the default buffering
    pub buffer_size: usize,
    /// Display name used in error messages
    pub name: Option<String>,
}

impl StreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The caller's descriptor and who is responsible for closing it
enum OriginalFd {
    /// Borrowed from the caller; only closed on explicit request
    Borrowed(RawFd),
    /// Handed over by the caller; closed with the attachment
    Owned(OwnedFd),
}

impl OriginalFd {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            OriginalFd::Borrowed(fd) => *fd,
            OriginalFd::Owned(fd) => fd.as_raw_fd(),
        }
    }
}

/// Everything a stream owns while attached
struct Attachment {
    original: OriginalFd,
    stream: FdBuffer,
    mode: AccessMode,
    seekable: bool,
    buffer_size: usize,
}

/// Buffered I/O on a file descriptor
pub struct FilebufStream {
    attachment: Option<Attachment>,
    name: String,
}

impl FilebufStream {
    /// Creates an unattached stream
    pub fn new() -> Self {
        FilebufStream {
            attachment: None,
            name: String::new(),
        }
    }

    /// Creates a stream attached to a borrowed descriptor
    pub fn open(fd: BorrowedFd<'_>, buffer_size: usize) -> StreamResult<Self> {
        let mut stream = Self::new();
        stream.attach(fd, buffer_size)?;
        Ok(stream)
    }

    /// Creates a stream attached to a borrowed descriptor using `options`
    pub fn open_with(fd: BorrowedFd<'_>, options: &StreamOptions) -> StreamResult<Self> {
        let mut stream = Self::new();
        stream.attach_with(fd, options)?;
        Ok(stream)
    }

    /// Sets the display name and returns the stream
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Attaches to a descriptor the caller keeps ownership of
    ///
    /// The descriptor is duplicated, so this stream gets its own handle,
    /// and rewound to offset 0. A `buffer_size` of 0 leaves buffering at
    /// its default; any other value allocates exactly that many bytes.
    pub fn attach(&mut self, fd: BorrowedFd<'_>, buffer_size: usize) -> StreamResult<()> {
        self.ensure_unattached()?;
        let (mode, stream, seekable) = self.prepare(fd, buffer_size)?;
        self.install(OriginalFd::Borrowed(fd.as_raw_fd()), mode, stream, seekable, buffer_size);
        Ok(())
    }

    /// Attaches to a descriptor whose ownership moves to this stream
    ///
    /// The descriptor is closed when the stream is detached or dropped,
    /// or right away if attaching fails.
    pub fn attach_owned(&mut self, fd: OwnedFd, buffer_size: usize) -> StreamResult<()> {
        self.ensure_unattached()?;
        let (mode, stream, seekable) = self.prepare(fd.as_fd(), buffer_size)?;
        self.install(OriginalFd::Owned(fd), mode, stream, seekable, buffer_size);
        Ok(())
    }

    /// Attaches to a borrowed descriptor using `options`
    pub fn attach_with(&mut self, fd: BorrowedFd<'_>, options: &StreamOptions) -> StreamResult<()> {
        self.attach(fd, options.buffer_size)?;
        if let Some(name) = &options.name {
            self.name = name.clone();
        }
        Ok(())
    }

    fn ensure_unattached(&self) -> StreamResult<()> {
        match self.attachment {
            Some(_) => Err(StreamError::AlreadyAttached),
            None => Ok(()),
        }
    }

    /// Classifies `fd`, duplicates it and probes the duplicate
    ///
    /// Nothing outlives a failure here: the duplicate and its buffer are
    /// dropped on every error path.
    fn prepare(&self, fd: BorrowedFd<'_>, buffer_size: usize) -> StreamResult<(AccessMode, FdBuffer, bool)> {
        let mode = AccessMode::query(fd)?;
        let mut stream = FdBuffer::from_borrowed(fd, buffer_size)?;
        if let Err(e) = stream.rewind() {
            debug!("Rewind of {} on attach failed: {}", self.name, e);
        }

        // Position-neutral probe; one lseek on the duplicate.
        let seekable = stream.seek(SeekFrom::Current(0)).is_ok();

        debug!(
            "Attached fd {} (mode \"{}\", seekable: {}, buffer: {} bytes)",
            fd.as_raw_fd(),
            mode.mode_str(),
            seekable,
            stream.capacity()
        );
        Ok((mode, stream, seekable))
    }

    fn install(&mut self, original: OriginalFd, mode: AccessMode, stream: FdBuffer, seekable: bool, buffer_size: usize) {
        self.attachment = Some(Attachment {
            original,
            stream,
            mode,
            seekable,
            buffer_size,
        });
    }

    /// Releases the duplicate descriptor and the buffer
    ///
    /// An owned original descriptor is closed, a borrowed one stays open.
    /// Detaching an unattached stream does nothing.
    pub fn detach(&mut self) {
        self.release(false);
    }

    /// Detaches and also closes a borrowed original descriptor
    ///
    /// `attach_owned` is the safe way to have the stream close the
    /// caller's descriptor.
    ///
    /// # Safety
    ///
    /// The descriptor given to `attach` must not be used or closed by
    /// anything else afterwards. Whatever owns it has to give it up first,
    /// e.g. through `IntoRawFd`.
    pub unsafe fn detach_and_close(&mut self) {
        self.release(true);
    }

    /// Failures while closing are logged and otherwise ignored
    fn release(&mut self, close_original: bool) {
        let Some(attachment) = self.attachment.take() else {
            return;
        };
        let Attachment { original, stream, .. } = attachment;
        drop(stream);

        match original {
            OriginalFd::Borrowed(fd) if close_original => {
                debug!("Closing original fd {}", fd);
                if let Err(e) = nix::unistd::close(fd) {
                    warn!("Closing fd {} failed: {}", fd, e);
                }
            }
            OriginalFd::Borrowed(fd) => debug!("Detached from fd {}", fd),
            OriginalFd::Owned(fd) => debug!("Closing owned fd {}", fd.as_raw_fd()),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Size of the explicitly requested buffer, 0 for default buffering
    pub fn buffer_size(&self) -> usize {
        self.attachment.as_ref().map_or(0, |a| a.buffer_size)
    }

    /// Reads whatever is available, up to `buf.len()` bytes
    ///
    /// Bytes read before an OS error are returned and the error is left
    /// for the next call, which sees it again. An error only comes back
    /// when nothing was read, so `Ok(0)` for a non-empty `buf` means end
    /// of stream.
    pub fn read_available(&mut self, buf: &mut [u8]) -> StreamResult<usize> {
        let attachment = match self.attachment.as_mut() {
            Some(a) if a.mode.is_readable() => a,
            _ => return Err(StreamError::NotReadable { name: self.name.clone() }),
        };

        match attachment.stream.read(buf) {
            (0, Some(source)) => Err(StreamError::ReadFailure { name: self.name.clone(), source }),
            (bytes_read, Some(source)) => {
                debug!("Read error on {} after {} bytes: {}", self.name, bytes_read, source);
                Ok(bytes_read)
            }
            (bytes_read, None) => Ok(bytes_read),
        }
    }

    /// Access mode detected when attaching
    pub fn access_mode(&self) -> Option<AccessMode> {
        self.attachment.as_ref().map(|a| a.mode)
    }

    /// The caller's descriptor, if attached
    pub fn original_fd(&self) -> Option<RawFd> {
        self.attachment.as_ref().map(|a| a.original.as_raw_fd())
    }
}

impl Default for FilebufStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FilebufStream {
    fn drop(&mut self) {
        self.release(false);
    }
}

impl ByteStream for FilebufStream {
    fn write(&mut self, buf: &[u8]) -> StreamResult<()> {
        let attachment = match self.attachment.as_mut() {
            Some(a) if a.mode.is_writable() => a,
            _ => return Err(StreamError::NotWritable { name: self.name.clone() }),
        };
        if !buf.is_empty() {
            attachment.stream.write(buf).map_err(|source| StreamError::WriteFailure {
                name: self.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], throw_on_short_read: bool) -> StreamResult<usize> {
        let attachment = match self.attachment.as_mut() {
            Some(a) if a.mode.is_readable() => a,
            _ => return Err(StreamError::NotReadable { name: self.name.clone() }),
        };

        let (bytes_read, error) = attachment.stream.read(buf);
        if let Some(source) = error {
            if throw_on_short_read {
                return Err(StreamError::ReadFailure { name: self.name.clone(), source });
            }
            warn!("Read error on {} after {} bytes: {}", self.name, bytes_read, source);
        } else if bytes_read < buf.len() && throw_on_short_read {
            return Err(StreamError::ShortRead {
                requested: buf.len(),
                actual: bytes_read,
                name: self.name.clone(),
            });
        }
        Ok(bytes_read)
    }

    fn seek(&mut self, offset: i64, option: SeekOption) -> StreamResult<u64> {
        let Some(attachment) = self.attachment.as_mut() else {
            return Ok(0);
        };
        option
            .to_seek_from(offset)
            .and_then(|target| attachment.stream.seek(target))
            .map_err(|source| StreamError::SeekFailure { name: self.name.clone(), source })
    }

    /// Determines the length by seeking to the end and back
    ///
    /// When the device cannot seek, the current position is taken as the
    /// length.
    fn length(&mut self) -> StreamResult<u64> {
        let position = match self.seek(0, SeekOption::FromCurrent) {
            Ok(position) => position,
            Err(_) => self.attachment.as_ref().map_or(0, |a| a.stream.position()),
        };
        match self.seek(0, SeekOption::FromEnd) {
            Err(_) => Ok(position),
            Ok(length) => {
                self.seek(position as i64, SeekOption::FromStart)?;
                Ok(length)
            }
        }
    }

    fn flush(&mut self) -> StreamResult<()> {
        if let Some(attachment) = self.attachment.as_mut() {
            attachment.stream.flush().map_err(|source| StreamError::WriteFailure {
                name: self.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Rewinds to the start of the stream, dropping any buffered data
    fn resync(&mut self) -> StreamResult<()> {
        if let Some(attachment) = self.attachment.as_mut() {
            attachment.stream.rewind().map_err(|source| StreamError::WriteFailure {
                name: self.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn is_readable(&self) -> bool {
        self.attachment.as_ref().is_some_and(|a| a.mode.is_readable())
    }

    fn is_writable(&self) -> bool {
        self.attachment.as_ref().is_some_and(|a| a.mode.is_writable())
    }

    fn is_seekable(&self) -> bool {
        self.attachment.as_ref().is_some_and(|a| a.seekable)
    }

    fn file_name(&self) -> &str {
        &self.name
    }
}

impl io::Read for FilebufStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_available(buf)?)
    }
}

impl io::Write for FilebufStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ByteStream::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(ByteStream::flush(self)?)
    }
}

impl io::Seek for FilebufStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let position = match pos {
            SeekFrom::Start(offset) => {
                let offset = i64::try_from(offset)
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;
                ByteStream::seek(self, offset, SeekOption::FromStart)?
            }
            SeekFrom::Current(offset) => ByteStream::seek(self, offset, SeekOption::FromCurrent)?,
            SeekFrom::End(offset) => ByteStream::seek(self, offset, SeekOption::FromEnd)?,
        };
        Ok(position)
    }
}
