//! Stream copy command
//!
//! This module implements copying one descriptor to another through a
//! pair of buffered streams, which works the same for files, pipes and
//! sockets.

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::commands::endpoint::{Endpoint, STDIO_NAME};
use crate::io::byte_stream::ByteStream;
use crate::io::errors::{StreamError, StreamResult};
use crate::io::filebuf::StreamOptions;

/// Bytes moved per read
const CHUNK_SIZE: usize = 64 * 1024;

/// Command for copying an input to an output
pub struct CopyCommand {
    /// Path to the input, `-` for stdin
    input: String,
    /// Path to the output, `-` for stdout
    output: String,
    /// Options for both streams
    options: StreamOptions,
}

impl CopyCommand {
    /// Create a new copy command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A new CopyCommand instance or an error
    pub fn new(args: &ArgMatches) -> StreamResult<Self> {
        let input = args.get_one::<String>("input")
            .ok_or_else(|| StreamError::from("Missing input file".to_string()))?
            .clone();

        let output = args.get_one::<String>("output")
            .cloned()
            .unwrap_or_else(|| STDIO_NAME.to_string());

        Ok(CopyCommand {
            input,
            output,
            options: super::stream_options_from_args(args),
        })
    }

    pub fn from_paths(input: &str, output: &str, options: StreamOptions) -> Self {
        CopyCommand {
            input: input.to_string(),
            output: output.to_string(),
            options,
        }
    }

    /// Copy the input to the output and return the number of bytes moved
    pub fn run(&self) -> StreamResult<u64> {
        let source = Endpoint::input(&self.input)?;
        let destination = Endpoint::output(&self.output)?;
        let mut reader = source.stream(&self.input, &self.options)?;
        let mut writer = destination.stream(&self.output, &self.options)?;

        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let n = reader.read_available(&mut chunk)?;
            if n == 0 {
                break;
            }
            writer.write(&chunk[..n])?;
            total += n as u64;
            debug!("Copied {} bytes ({} total)", n, total);
        }
        writer.flush()?;
        Ok(total)
    }
}

impl Command for CopyCommand {
    fn execute(&self) -> StreamResult<()> {
        let total = self.run()?;
        info!("Copied {} bytes from {} to {}", total, self.input, self.output);
        Ok(())
    }
}
