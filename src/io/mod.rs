//! I/O on file descriptors
//!
//! This module provides the byte stream interface and its buffered
//! implementation for any open descriptor.

pub mod access_mode;
pub mod byte_stream;
pub mod errors;
pub mod fd_buffer;
pub mod filebuf;
#[cfg(test)]
mod tests;

pub use access_mode::AccessMode;
pub use byte_stream::{ByteStream, Capabilities, SeekOption};
pub use errors::{StreamError, StreamResult};
pub use fd_buffer::{FdBuffer, DEFAULT_BUFFER_SIZE};
pub use filebuf::{FilebufStream, StreamOptions};
