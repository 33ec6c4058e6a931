//! Integration tests for descriptor streams

extern crate std;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::fd::AsFd;
use std::os::unix::net::UnixStream;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use fdstream::cli::build_cli;
use fdstream::commands::{CommandFactory, CopyCommand, FdstreamCommandFactory, ProbeCommand};
use fdstream::{AccessMode, ByteStream, FilebufStream, SeekOption, StreamError, StreamOptions};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_typed_values_through_stream() {
    init_logging();
    let file = tempfile::tempfile().unwrap();
    let mut stream = FilebufStream::open(file.as_fd(), 64).unwrap();

    stream.write_u32::<BigEndian>(0xCAFEBABE).unwrap();
    stream.write_f64::<LittleEndian>(2.5).unwrap();
    stream.write_u16::<LittleEndian>(42).unwrap();
    std::assert_eq!(stream.length().unwrap(), 14);

    Seek::seek(&mut stream, SeekFrom::Start(0)).unwrap();
    std::assert_eq!(stream.read_u32::<BigEndian>().unwrap(), 0xCAFEBABE);
    std::assert_eq!(stream.read_f64::<LittleEndian>().unwrap(), 2.5);
    std::assert_eq!(stream.read_u16::<LittleEndian>().unwrap(), 42);

    // Past the end the std reader reports end of stream.
    let error = stream.read_u8().unwrap_err();
    std::assert_eq!(error.kind(), std::io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_socket_pair_stream() {
    init_logging();
    let (left, right) = UnixStream::pair().unwrap();
    let mut sender = FilebufStream::open(left.as_fd(), 0).unwrap();
    let mut receiver = FilebufStream::open(right.as_fd(), 0).unwrap();

    std::assert_eq!(sender.access_mode(), Some(AccessMode::ReadWrite));
    std::assert!(!sender.is_seekable());
    std::assert!(receiver.is_readable());
    std::assert!(receiver.is_writable());

    sender.write_u32::<LittleEndian>(7).unwrap();
    sender.write_u32::<LittleEndian>(11).unwrap();
    ByteStream::flush(&mut sender).unwrap();

    std::assert_eq!(receiver.read_u32::<LittleEndian>().unwrap(), 7);
    std::assert_eq!(receiver.read_u32::<LittleEndian>().unwrap(), 11);
    std::assert!(matches!(
        ByteStream::seek(&mut receiver, 0, SeekOption::FromStart),
        Err(StreamError::SeekFailure { .. })
    ));
}

#[test]
fn test_original_descriptor_usable_after_stream() {
    let mut file = tempfile::tempfile().unwrap();
    {
        let mut stream = FilebufStream::open(file.as_fd(), 0).unwrap();
        ByteStream::write(&mut stream, b"from stream").unwrap();
    }

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    std::assert_eq!(contents, "from stream");
}

#[test]
fn test_copy_command_between_files() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bin");
    let output = dir.path().join("output.bin");

    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&input, &data).unwrap();

    let command = CopyCommand::from_paths(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        StreamOptions::new().buffer_size(1000),
    );
    std::assert_eq!(command.run().unwrap(), data.len() as u64);
    std::assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[test]
fn test_copy_command_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.bin");
    let output = dir.path().join("copy.bin");
    File::create(&input).unwrap();

    let command = CopyCommand::from_paths(input.to_str().unwrap(), output.to_str().unwrap(), StreamOptions::new());
    std::assert_eq!(command.run().unwrap(), 0);
    std::assert_eq!(std::fs::metadata(&output).unwrap().len(), 0);
}

#[test]
fn test_copy_command_surfaces_read_errors() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("copy.bin");

    // Reading a directory descriptor fails with EISDIR.
    let command = CopyCommand::from_paths(dir.path().to_str().unwrap(), output.to_str().unwrap(), StreamOptions::new());
    match command.run() {
        Err(StreamError::ReadFailure { source, .. }) => {
            std::assert_eq!(source.raw_os_error(), Some(nix::errno::Errno::EISDIR as i32));
        }
        other => panic!("expected a read failure, got {:?}", other),
    }
}

#[test]
fn test_copy_command_requires_input() {
    let matches = build_cli()
        .mut_arg("input", |arg| arg.required(false))
        .try_get_matches_from(["fdstream", "--copy"])
        .unwrap();

    match CopyCommand::new(&matches) {
        Err(StreamError::GenericError(message)) => std::assert_eq!(message, "Missing input file"),
        Err(other) => panic!("expected a generic error, got {:?}", other),
        Ok(_) => panic!("expected a missing input error"),
    }
}

#[test]
fn test_probe_command_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("probe.bin");
    let mut file = File::create(&input).unwrap();
    file.write_all(&[0u8; 1234]).unwrap();
    drop(file);

    let command = ProbeCommand::from_path(input.to_str().unwrap(), StreamOptions::new().name("probe"));
    let report = command.probe().unwrap();

    std::assert_eq!(report.name, "probe");
    std::assert_eq!(report.mode, Some(AccessMode::ReadOnly));
    std::assert!(report.capabilities.readable);
    std::assert!(!report.capabilities.writable);
    std::assert!(report.capabilities.seekable);
    std::assert_eq!(report.buffer_size, 0);
    std::assert_eq!(report.length, 1234);

    let text = report.to_string();
    std::assert!(text.contains("Mode: r"));
    std::assert!(text.contains("Buffer size: default"));
}

#[test]
fn test_probe_missing_input_fails() {
    let command = ProbeCommand::from_path("/nonexistent/fdstream/input", StreamOptions::new());
    std::assert!(matches!(command.probe(), Err(StreamError::IoError(_))));
}

#[test]
fn test_factory_runs_copy_from_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out.txt");
    std::fs::write(&input, b"argument driven copy").unwrap();

    let matches = build_cli()
        .try_get_matches_from([
            "fdstream",
            input.to_str().unwrap(),
            "--copy",
            "--output",
            output.to_str().unwrap(),
            "--buffer-size",
            "16",
        ])
        .unwrap();

    let command = FdstreamCommandFactory::new().create_command(&matches).unwrap();
    command.execute().unwrap();
    std::assert_eq!(std::fs::read(&output).unwrap(), b"argument driven copy");
}

#[test]
fn test_cli_rejects_bad_buffer_size() {
    let result = build_cli().try_get_matches_from(["fdstream", "input", "--buffer-size", "lots"]);
    std::assert!(result.is_err());
}
