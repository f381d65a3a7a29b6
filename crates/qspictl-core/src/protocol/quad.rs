//! Quad mode control
//!
//! Entering and leaving quad mode is a read-modify-write of the Quad Enable
//! bit in status register 2:
//!
//! 1. read SR1 and SR2
//! 2. set (enter) or clear (exit) the QE bit in SR2, leaving every other bit
//! 3. WREN, then WRSR with the original SR1 and the modified SR2
//! 4. poll SR1 until the write cycle finishes
//!
//! Device state is re-read on every call; nothing is cached between calls.
//! A failure at any step aborts the transition without retry or rollback,
//! and the flash must then be treated as being in an unknown wire mode
//! until the caller re-queries it with [`is_quad_enabled`].

use super::busy::{wait_ready, BusyPoll};
use super::status::{read_status1, read_status2, write_status};
use crate::error::Result;
use crate::spi::opcodes;
use crate::transport::SpiTransport;
use maybe_async::maybe_async;

/// Configuration for quad mode transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    /// Quad Enable bit mask in status register 2
    pub qe_mask: u8,
    /// Bound on the busy wait after the status write
    pub busy_poll: BusyPoll,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            qe_mask: opcodes::SR2_QE,
            busy_poll: BusyPoll::default(),
        }
    }
}

impl ModeConfig {
    /// Replace the busy wait bound
    pub const fn with_busy_poll(mut self, busy_poll: BusyPoll) -> Self {
        self.busy_poll = busy_poll;
        self
    }
}

/// Set the Quad Enable bit and wait for the device to finish the write
///
/// The status write is issued even when QE already reads as set. Skipping
/// it would save a write cycle but has not been verified on hardware.
#[maybe_async]
pub async fn enter_quad_mode<T: SpiTransport + ?Sized>(
    transport: &mut T,
    config: &ModeConfig,
) -> Result<()> {
    set_quad_enable(transport, config, true).await
}

/// Clear the Quad Enable bit and wait for the device to finish the write
///
/// Like [`enter_quad_mode`], always writes.
#[maybe_async]
pub async fn exit_quad_mode<T: SpiTransport + ?Sized>(
    transport: &mut T,
    config: &ModeConfig,
) -> Result<()> {
    set_quad_enable(transport, config, false).await
}

/// Check if the Quad Enable bit is set
///
/// Read-only; use it to learn the device state after a failed transition.
#[maybe_async]
pub async fn is_quad_enabled<T: SpiTransport + ?Sized>(
    transport: &mut T,
    config: &ModeConfig,
) -> Result<bool> {
    let sr2 = read_status2(transport).await?;
    Ok(sr2 & config.qe_mask != 0)
}

#[maybe_async]
async fn set_quad_enable<T: SpiTransport + ?Sized>(
    transport: &mut T,
    config: &ModeConfig,
    enable: bool,
) -> Result<()> {
    let action = if enable { "enter" } else { "exit" };

    let result = update_sr2(transport, config, enable).await;
    match result {
        Ok(()) => log::info!("quad mode {} complete", action),
        Err(e) => log::warn!("quad mode {} failed: {}; wire mode unknown", action, e),
    }
    result
}

#[maybe_async]
async fn update_sr2<T: SpiTransport + ?Sized>(
    transport: &mut T,
    config: &ModeConfig,
    enable: bool,
) -> Result<()> {
    let sr1 = read_status1(transport).await?;
    let sr2 = read_status2(transport).await?;

    let new_sr2 = if enable {
        sr2 | config.qe_mask
    } else {
        sr2 & !config.qe_mask
    };
    log::debug!(
        "SR1=0x{:02X} SR2=0x{:02X} -> 0x{:02X}",
        sr1,
        sr2,
        new_sr2
    );

    write_status(transport, sr1, new_sr2).await?;
    wait_ready(transport, &config.busy_poll).await
}

/// Quad mode controller
///
/// Holds the transition configuration so that the same settings are used
/// for every enter/exit on a device. Implements
/// [`QuadModeHooks`](crate::bus::QuadModeHooks) for use with a
/// [`BusAttachment`](crate::bus::BusAttachment).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeController {
    config: ModeConfig,
}

#[maybe_async]
impl ModeController {
    /// Create a controller with the given configuration
    pub const fn new(config: ModeConfig) -> Self {
        Self { config }
    }

    /// Get the transition configuration
    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    /// See [`enter_quad_mode`]
    pub async fn enter_quad_mode<T: SpiTransport + ?Sized>(&self, transport: &mut T) -> Result<()> {
        enter_quad_mode(transport, &self.config).await
    }

    /// See [`exit_quad_mode`]
    pub async fn exit_quad_mode<T: SpiTransport + ?Sized>(&self, transport: &mut T) -> Result<()> {
        exit_quad_mode(transport, &self.config).await
    }

    /// See [`is_quad_enabled`]
    pub async fn is_quad_enabled<T: SpiTransport + ?Sized>(&self, transport: &mut T) -> Result<bool> {
        is_quad_enabled(transport, &self.config).await
    }
}
