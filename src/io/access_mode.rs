//! Descriptor access mode detection
//!
//! The access mode of an open descriptor decides which operations a stream
//! built on it allows.

use std::os::fd::{AsRawFd, BorrowedFd};

use log::debug;
use nix::fcntl::{fcntl, FcntlArg, OFlag};

/// Access mode an open descriptor was opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    /// Classifies raw open flags as returned by `fcntl(F_GETFL)`
    ///
    /// Any combination of access bits that is not read-only, write-only or
    /// read-write falls back to read-only.
    pub fn from_flags(flags: OFlag) -> Self {
        let access = flags & OFlag::O_ACCMODE;
        if access == OFlag::O_RDWR {
            AccessMode::ReadWrite
        } else if access == OFlag::O_WRONLY {
            AccessMode::WriteOnly
        } else {
            if access != OFlag::O_RDONLY {
                debug!("Unrecognized access mode bits {:#o}, treating as read-only", access.bits());
            }
            AccessMode::ReadOnly
        }
    }

    /// Queries the access mode of an open descriptor
    pub fn query(fd: BorrowedFd<'_>) -> nix::Result<Self> {
        let raw = fcntl(fd.as_raw_fd(), FcntlArg::F_GETFL)?;
        Ok(Self::from_flags(OFlag::from_bits_retain(raw)))
    }

    /// The equivalent stdio open mode string
    pub fn mode_str(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "r",
            AccessMode::WriteOnly => "w",
            AccessMode::ReadWrite => "r+",
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }
}
