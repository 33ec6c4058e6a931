//! Command line stream endpoints
//!
//! An endpoint is either a path or `-` for the process's standard
//! streams. It keeps the opened file alive while a `FilebufStream`
//! borrows its descriptor.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsFd, BorrowedFd};

use crate::io::errors::StreamResult;
use crate::io::filebuf::{FilebufStream, StreamOptions};

/// Name used for the standard streams
pub const STDIO_NAME: &str = "-";

/// Source or destination of a command
pub enum Endpoint {
    Stdin(io::Stdin),
    Stdout(io::Stdout),
    File(File),
}

impl Endpoint {
    /// Opens `path` for reading, `-` meaning stdin
    pub fn input(path: &str) -> io::Result<Self> {
        if path == STDIO_NAME {
            Ok(Endpoint::Stdin(io::stdin()))
        } else {
            Ok(Endpoint::File(File::open(path)?))
        }
    }

    /// Creates or truncates `path` for writing, `-` meaning stdout
    pub fn output(path: &str) -> io::Result<Self> {
        if path == STDIO_NAME {
            Ok(Endpoint::Stdout(io::stdout()))
        } else {
            let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
            Ok(Endpoint::File(file))
        }
    }

    fn descriptor(&self) -> BorrowedFd<'_> {
        match self {
            Endpoint::Stdin(stdin) => stdin.as_fd(),
            Endpoint::Stdout(stdout) => stdout.as_fd(),
            Endpoint::File(file) => file.as_fd(),
        }
    }

    /// Attaches a stream to this endpoint
    ///
    /// The stream is named after `path` unless `options` carries a name.
    pub fn stream(&self, path: &str, options: &StreamOptions) -> StreamResult<FilebufStream> {
        let mut stream = FilebufStream::new();
        stream.set_name(path);
        stream.attach_with(self.descriptor(), options)?;
        Ok(stream)
    }
}
