//! Error types for qspictl-core
//!
//! This module provides a no_std compatible error type shared by the
//! transport layer, the mode controller and the bus attachment.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Transport errors
    /// The underlying exchange failed (bus fault, device absent, transport timeout)
    Transport,
    /// Opcode is not supported by the transport
    OpcodeNotSupported,
    /// Requested I/O mode is not supported by the transport or attachment
    IoModeNotSupported,
    /// Transfer does not fit the command's address space
    AddressOutOfRange,

    // Device errors
    /// The busy bit was still set after the configured number of polls
    DeviceNotReady {
        /// Number of status register 1 reads issued before giving up
        polls: u32,
    },

    // Attachment errors
    /// Attachment name is empty or does not fit the name buffer
    InvalidName,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "SPI transport exchange failed"),
            Self::OpcodeNotSupported => write!(f, "SPI opcode not supported by transport"),
            Self::IoModeNotSupported => write!(f, "I/O mode not supported"),
            Self::AddressOutOfRange => write!(f, "address out of range"),
            Self::DeviceNotReady { polls } => {
                write!(f, "device still busy after {} status polls", polls)
            }
            Self::InvalidName => write!(f, "invalid attachment name"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
