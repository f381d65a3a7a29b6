//! Transport trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for Embassy, tokio)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::Result;
use crate::spi::SpiCommand;
use bitflags::bitflags;
use maybe_async::maybe_async;

bitflags! {
    /// Transport feature flags
    ///
    /// These flags indicate which wide data phases a transport can clock.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransportFeatures: u32 {
        /// Can read four bits at once (1-1-4 mode)
        const QUAD_IN = 1 << 0;
        /// Can transfer four bits at once (1-4-4 mode)
        const QUAD_IO = 1 << 1;

        /// Shorthand for full quad support
        const QUAD = Self::QUAD_IN.bits() | Self::QUAD_IO.bits();
    }
}

impl Default for TransportFeatures {
    fn default() -> Self {
        TransportFeatures::empty()
    }
}

/// Chip-select addressed SPI link (sync or async depending on `is_sync`)
///
/// A transport executes one [`SpiCommand`] per call with chip select held
/// for the whole exchange. Two shapes are used by the mode controller:
///
/// - send N bytes: `read_buf` is empty
/// - send M bytes, then receive K bytes: `read_buf` has K bytes
///
/// Implementations report an exchange failure as
/// [`Error::Transport`](crate::Error::Transport), keeping their own detailed
/// error for logging.
#[maybe_async(AFIT)]
pub trait SpiTransport {
    /// Get the features supported by this transport
    fn features(&self) -> TransportFeatures;

    /// Get the maximum number of bytes that can be read in a single exchange
    fn max_read_len(&self) -> usize;

    /// Execute a single SPI exchange
    ///
    /// The command's `io_mode` selects how many lines the data phase uses.
    /// Transports must reject modes they cannot clock with
    /// [`Error::IoModeNotSupported`](crate::Error::IoModeNotSupported)
    /// rather than silently falling back to single I/O.
    async fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()>;

    /// Delay for the specified number of microseconds
    async fn delay_us(&mut self, us: u32);
}

// Blanket impl for boxed transports to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl SpiTransport for alloc::boxed::Box<dyn SpiTransport + Send> {
    fn features(&self) -> TransportFeatures {
        (**self).features()
    }

    fn max_read_len(&self) -> usize {
        (**self).max_read_len()
    }

    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        (**self).execute(cmd)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Information about a transport backend
#[derive(Debug, Clone)]
pub struct TransportInfo {
    /// Name of the transport
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description, including accepted options
    pub description: &'static str,
}
