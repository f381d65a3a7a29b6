//! Enter/exit hooks invoked around wide transfers

use crate::error::Result;
use crate::protocol::{self, ModeController};
use crate::transport::SpiTransport;
use maybe_async::maybe_async;

/// Callbacks a bus attachment runs around a sequence of quad transfers
///
/// Both hooks receive the attachment's transport for the duration of the
/// call only.
#[maybe_async(AFIT)]
pub trait QuadModeHooks<T: SpiTransport + ?Sized> {
    /// Put the device into quad mode before wide transfers
    async fn enter_quad(&mut self, transport: &mut T) -> Result<()>;

    /// Return the device to single mode after wide transfers
    async fn exit_quad(&mut self, transport: &mut T) -> Result<()>;
}

#[maybe_async(AFIT)]
impl<T: SpiTransport + ?Sized> QuadModeHooks<T> for ModeController {
    async fn enter_quad(&mut self, transport: &mut T) -> Result<()> {
        protocol::enter_quad_mode(transport, self.config()).await
    }

    async fn exit_quad(&mut self, transport: &mut T) -> Result<()> {
        protocol::exit_quad_mode(transport, self.config()).await
    }
}
