//! qspictl-linux-spi - Linux spidev transport
//!
//! Drives a flash chip through `/dev/spidevX.Y`. Status register commands
//! run on a single data line; with `quad=1` the controller is opened with
//! `SPI_RX_QUAD` and the data phase of quad output reads is received on
//! four lines.
//!
//! # Example
//!
//! ```no_run
//! use qspictl_core::protocol::{self, ModeConfig};
//! use qspictl_linux_spi::{LinuxSpi, LinuxSpiConfig};
//!
//! let config = LinuxSpiConfig::new("/dev/spidev0.0")
//!     .with_speed(10_000_000)
//!     .with_quad(true);
//! let mut spi = LinuxSpi::open(&config)?;
//! protocol::enter_quad_mode(&mut spi, &ModeConfig::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Transport string
//!
//! ```bash
//! qspictl status -t linux_spi:dev=/dev/spidev0.0
//! qspictl read -t linux_spi:dev=/dev/spidev0.0,spispeed=20000,quad=1 --length 4096 -o out.bin
//! ```
//!
//! Requires a kernel with `CONFIG_SPI_SPIDEV` and, for quad reads, a
//! controller driver that supports `SPI_RX_QUAD`.

pub mod config;
pub mod device;
pub mod error;

pub use config::{mode, parse_options, LinuxSpiConfig, DEFAULT_SPEED_HZ};
pub use device::LinuxSpi;
pub use error::{LinuxSpiError, Result};

use qspictl_core::transport::SpiTransport;

/// Open a spidev device from transport options and box it
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn SpiTransport + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let spi = LinuxSpi::open(&config)?;
    Ok(Box::new(spi))
}
