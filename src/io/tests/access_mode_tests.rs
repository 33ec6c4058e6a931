//! Tests for access mode detection

extern crate std;

use std::os::fd::AsFd;

use nix::fcntl::OFlag;

use super::test_utils::{pipe, read_only_file, scratch_file, write_only_file};
use crate::io::access_mode::AccessMode;

#[test]
fn test_from_flags_plain_modes() {
    std::assert_eq!(AccessMode::from_flags(OFlag::O_RDONLY), AccessMode::ReadOnly);
    std::assert_eq!(AccessMode::from_flags(OFlag::O_WRONLY), AccessMode::WriteOnly);
    std::assert_eq!(AccessMode::from_flags(OFlag::O_RDWR), AccessMode::ReadWrite);
}

#[test]
fn test_from_flags_ignores_status_bits() {
    let flags = OFlag::O_RDWR | OFlag::O_APPEND | OFlag::O_NONBLOCK;
    std::assert_eq!(AccessMode::from_flags(flags), AccessMode::ReadWrite);

    let flags = OFlag::O_WRONLY | OFlag::O_APPEND;
    std::assert_eq!(AccessMode::from_flags(flags), AccessMode::WriteOnly);
}

#[test]
fn test_from_flags_unrecognized_falls_back_to_read_only() {
    // Both access bits set is not a valid access mode.
    std::assert_eq!(AccessMode::from_flags(OFlag::O_ACCMODE), AccessMode::ReadOnly);
}

#[test]
fn test_query_files() {
    let (_dir, file) = read_only_file(b"data");
    std::assert_eq!(AccessMode::query(file.as_fd()).unwrap(), AccessMode::ReadOnly);

    let (_dir, file) = write_only_file();
    std::assert_eq!(AccessMode::query(file.as_fd()).unwrap(), AccessMode::WriteOnly);

    let file = scratch_file(b"");
    std::assert_eq!(AccessMode::query(file.as_fd()).unwrap(), AccessMode::ReadWrite);
}

#[test]
fn test_query_pipe_ends() {
    let (read_end, write_end) = pipe();
    std::assert_eq!(AccessMode::query(read_end.as_fd()).unwrap(), AccessMode::ReadOnly);
    std::assert_eq!(AccessMode::query(write_end.as_fd()).unwrap(), AccessMode::WriteOnly);
}

#[test]
fn test_mode_strings_and_flags() {
    std::assert_eq!(AccessMode::ReadOnly.mode_str(), "r");
    std::assert_eq!(AccessMode::WriteOnly.mode_str(), "w");
    std::assert_eq!(AccessMode::ReadWrite.mode_str(), "r+");

    std::assert!(AccessMode::ReadOnly.is_readable());
    std::assert!(!AccessMode::ReadOnly.is_writable());
    std::assert!(!AccessMode::WriteOnly.is_readable());
    std::assert!(AccessMode::WriteOnly.is_writable());
    std::assert!(AccessMode::ReadWrite.is_readable());
    std::assert!(AccessMode::ReadWrite.is_writable());
}
