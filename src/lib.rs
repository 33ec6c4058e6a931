//! Buffered byte streams over Unix file descriptors
//!
//! Any open descriptor, whether a regular file, a pipe or a socket, can be
//! attached to a [`FilebufStream`]. The stream figures out whether the
//! descriptor is readable, writable and seekable and buffers the traffic
//! in userspace.

pub mod io;
pub mod utils;
pub mod commands;
pub mod cli;

pub use io::{AccessMode, ByteStream, Capabilities, FilebufStream, SeekOption, StreamError, StreamOptions, StreamResult};
