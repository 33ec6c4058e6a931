//! Descriptor capability probing command
//!
//! This module implements the command that attaches a stream to an input
//! and reports what the stream found out about the device.

use std::fmt;

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::commands::endpoint::Endpoint;
use crate::io::access_mode::AccessMode;
use crate::io::byte_stream::{ByteStream, Capabilities};
use crate::io::errors::{StreamError, StreamResult};
use crate::io::filebuf::StreamOptions;

/// What a probe found out about an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub name: String,
    pub mode: Option<AccessMode>,
    pub capabilities: Capabilities,
    pub buffer_size: usize,
    pub length: u64,
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stream: {}", self.name)?;
        writeln!(f, "  Mode: {}", self.mode.map_or("-", |m| m.mode_str()))?;
        writeln!(f, "  Readable: {}", self.capabilities.readable)?;
        writeln!(f, "  Writable: {}", self.capabilities.writable)?;
        writeln!(f, "  Seekable: {}", self.capabilities.seekable)?;
        if self.buffer_size == 0 {
            writeln!(f, "  Buffer size: default")?;
        } else {
            writeln!(f, "  Buffer size: {} bytes", self.buffer_size)?;
        }
        write!(f, "  Length: {} bytes", self.length)
    }
}

/// Command for reporting the capabilities of a descriptor
pub struct ProbeCommand {
    /// Path to the input, `-` for stdin
    input: String,
    /// Options for the attached stream
    options: StreamOptions,
}

impl ProbeCommand {
    /// Create a new probe command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A new ProbeCommand instance or an error
    pub fn new(args: &ArgMatches) -> StreamResult<Self> {
        let input = args.get_one::<String>("input")
            .ok_or_else(|| StreamError::from("Missing input file".to_string()))?
            .clone();

        Ok(ProbeCommand {
            input,
            options: super::stream_options_from_args(args),
        })
    }

    pub fn from_path(input: &str, options: StreamOptions) -> Self {
        ProbeCommand {
            input: input.to_string(),
            options,
        }
    }

    /// Attach to the input and collect its capabilities
    pub fn probe(&self) -> StreamResult<ProbeReport> {
        let endpoint = Endpoint::input(&self.input)?;
        let mut stream = endpoint.stream(&self.input, &self.options)?;
        debug!("Probing {}", stream.file_name());

        let length = stream.length()?;
        Ok(ProbeReport {
            name: stream.file_name().to_string(),
            mode: stream.access_mode(),
            capabilities: stream.capabilities(),
            buffer_size: stream.buffer_size(),
            length,
        })
    }
}

impl Command for ProbeCommand {
    fn execute(&self) -> StreamResult<()> {
        let report = self.probe()?;
        info!("Probe of {} complete", report.name);
        println!("{}", report);
        Ok(())
    }
}
