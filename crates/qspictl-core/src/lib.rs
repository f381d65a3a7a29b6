//! qspictl-core - SPI NOR quad-mode control
//!
//! This crate switches SPI NOR flash chips between single-wire and quad-wire
//! operation by read-modify-writing the Quad Enable bit in status register 2,
//! then waiting for the device's internal write cycle to finish. It is
//! designed to be `no_std` compatible for use in embedded environments.
//!
//! # Features
//!
//! None are enabled by default.
//!
//! - `std` - Enable standard library support (includes `alloc` and board
//!   configuration files)
//! - `alloc` - Enable heap allocation (boxed transports)
//! - `is_sync` - Compile the transport-facing code as blocking functions
//!   instead of `async fn`
//!
//! # Example
//!
//! ```ignore
//! use qspictl_core::protocol::{self, ModeConfig};
//! use qspictl_core::transport::SpiTransport;
//!
//! fn enable_quad<T: SpiTransport>(transport: &mut T) -> qspictl_core::Result<()> {
//!     let cfg = ModeConfig::default();
//!     protocol::enter_quad_mode(transport, &cfg)?;
//!     assert!(protocol::is_quad_enabled(transport, &cfg)?);
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
#[cfg(feature = "std")]
pub mod config;
pub mod error;
pub mod protocol;
pub mod spi;
pub mod transport;

pub use error::{Error, Result};
