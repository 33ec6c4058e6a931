//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod endpoint;
pub mod probe_command;
pub mod copy_command;

pub use command_traits::{Command, CommandFactory};
pub use probe_command::{ProbeCommand, ProbeReport};
pub use copy_command::CopyCommand;

use clap::ArgMatches;
use crate::io::errors::StreamResult;
use crate::io::filebuf::StreamOptions;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct FdstreamCommandFactory;

impl FdstreamCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        FdstreamCommandFactory
    }
}

impl Default for FdstreamCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for FdstreamCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> StreamResult<Box<dyn Command>> {
        if args.get_flag("copy") {
            Ok(Box::new(CopyCommand::new(args)?))
        } else {
            // Default to probe command
            Ok(Box::new(ProbeCommand::new(args)?))
        }
    }
}

/// Builds stream options from the `--buffer-size` and `--name` flags
pub(crate) fn stream_options_from_args(args: &ArgMatches) -> StreamOptions {
    let mut options = StreamOptions::new();
    if let Some(size) = args.get_one::<usize>("buffer-size") {
        options = options.buffer_size(*size);
    }
    if let Some(name) = args.get_one::<String>("name") {
        options = options.name(name.clone());
    }
    options
}
