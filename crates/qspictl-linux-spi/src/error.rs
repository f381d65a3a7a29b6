//! Error types for spidev access

use thiserror::Error;

/// Linux spidev errors
#[derive(Debug, Error)]
pub enum LinuxSpiError {
    /// Failed to open the character device
    #[error("failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The controller rejected the requested mode bits
    #[error("failed to set SPI mode 0x{mode:X}: {source}")]
    SetModeFailed {
        mode: u32,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bits per word
    #[error("failed to set {bits} bits per word: {source}")]
    SetBitsPerWordFailed {
        bits: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("failed to set clock speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },

    /// SPI_IOC_MESSAGE failed
    #[error("SPI transfer failed: {0}")]
    TransferFailed(#[source] std::io::Error),

    /// Exchange does not fit the kernel buffer
    #[error("exchange of {len} bytes exceeds spidev buffer of {max} bytes")]
    TooLong { len: usize, max: usize },

    /// Bad transport option
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// `dev=` missing from the transport options
    #[error("no device specified, use dev=/dev/spidevX.Y")]
    NoDevice,
}

/// Result type for spidev operations
pub type Result<T> = std::result::Result<T, LinuxSpiError>;
