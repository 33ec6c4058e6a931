//! Custom error types for descriptor stream processing

use std::fmt;
use std::io;

/// Byte stream error types
#[derive(Debug)]
pub enum StreamError {
    /// Read attempted on a stream that is not readable
    NotReadable {
        name: String,
    },
    /// Write attempted on a stream that is not writable
    NotWritable {
        name: String,
    },
    /// The underlying write did not succeed
    WriteFailure {
        name: String,
        source: io::Error,
    },
    /// The underlying stream reported an error state during a read
    ReadFailure {
        name: String,
        source: io::Error,
    },
    /// Fewer bytes than requested were read
    ShortRead {
        requested: usize,
        actual: usize,
        name: String,
    },
    /// Repositioning the stream failed
    SeekFailure {
        name: String,
        source: io::Error,
    },
    /// The stream is already bound to a descriptor
    AlreadyAttached,
    /// I/O error while binding to a descriptor
    IoError(io::Error),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::NotReadable { name } => write!(f, "FilebufStream {} - is not readable", name),
            StreamError::NotWritable { name } => write!(f, "FilebufStream {} - is not writable", name),
            StreamError::WriteFailure { name, source } => {
                write!(f, "FilebufStream: write error in {}: {}", name, source)
            }
            StreamError::ReadFailure { name, source } => {
                write!(f, "FilebufStream::read {} - read returned a bad value: {}", name, source)
            }
            StreamError::ShortRead { requested, actual, name } => write!(
                f,
                "FilebufStream::read - incorrect number of bytes ({} out of {}) read for file {}",
                actual, requested, name
            ),
            StreamError::SeekFailure { name, source } => {
                write!(f, "FilebufStream::seek {} - {}", name, source)
            }
            StreamError::AlreadyAttached => write!(f, "FilebufStream is already attached to a descriptor"),
            StreamError::IoError(e) => write!(f, "I/O error: {}", e),
            StreamError::GenericError(msg) => write!(f, "fdstream error: {}", msg),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::WriteFailure { source, .. }
            | StreamError::ReadFailure { source, .. }
            | StreamError::SeekFailure { source, .. } => Some(source),
            StreamError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(error: io::Error) -> Self {
        StreamError::IoError(error)
    }
}

impl From<nix::Error> for StreamError {
    fn from(error: nix::Error) -> Self {
        StreamError::IoError(io::Error::from(error))
    }
}

impl From<StreamError> for io::Error {
    fn from(error: StreamError) -> Self {
        match error {
            StreamError::WriteFailure { source, .. }
            | StreamError::ReadFailure { source, .. }
            | StreamError::SeekFailure { source, .. }
            | StreamError::IoError(source) => source,
            StreamError::ShortRead { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, error),
            StreamError::NotReadable { .. } | StreamError::NotWritable { .. } => {
                io::Error::new(io::ErrorKind::PermissionDenied, error)
            }
            StreamError::AlreadyAttached | StreamError::GenericError(_) => io::Error::new(io::ErrorKind::Other, error),
        }
    }
}

impl From<String> for StreamError {
    fn from(msg: String) -> Self {
        StreamError::GenericError(msg)
    }
}

/// Result type for byte stream operations
pub type StreamResult<T> = Result<T, StreamError>;
