//! Command line definition
//!
//! Kept in the library so the argument handling can be tested without
//! spawning the binary.

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

/// Builds the clap definition of the `fdstream` tool
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("fdstream")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Probe and copy files, pipes and sockets through buffered descriptor streams")
        .arg(
            Arg::new("input")
                .help("Input file, or - for stdin")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("copy")
                .short('c')
                .long("copy")
                .help("Copy the input to the output instead of probing it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file for --copy, or - for stdout")
                .value_name("FILE")
                .default_value("-")
                .required(false),
        )
        .arg(
            Arg::new("buffer-size")
                .short('b')
                .long("buffer-size")
                .help("Stream buffer size in bytes (0 uses the default buffering)")
                .value_name("BYTES")
                .value_parser(value_parser!(usize))
                .required(false),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .help("Display name used for the streams in messages")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also write log messages to this file")
                .value_name("FILE")
                .required(false),
        )
}
