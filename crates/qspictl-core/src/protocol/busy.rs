//! Busy polling
//!
//! Waits for the device to clear the WIP bit of status register 1 after a
//! write-type command.

use super::status::read_status1;
use crate::error::{Error, Result};
use crate::spi::opcodes;
use crate::transport::SpiTransport;
use maybe_async::maybe_async;

/// Default busy wait budget in microseconds
pub const DEFAULT_BUSY_TIMEOUT_US: u32 = 500_000;
/// Default delay between busy polls in microseconds
pub const DEFAULT_POLL_DELAY_US: u32 = 10;

/// Bound on how long [`wait_ready`] spins on the busy bit
///
/// The bound is expressed as a number of status register 1 reads. A
/// duration bound is converted into a read budget from the poll delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyPoll {
    max_polls: Option<u32>,
    poll_delay_us: u32,
}

impl BusyPoll {
    /// Spin until the busy bit clears, however long that takes
    ///
    /// A device that never clears the bit hangs the caller. Prefer a bounded
    /// poll unless the hardware is known good.
    pub const fn unbounded() -> Self {
        Self {
            max_polls: None,
            poll_delay_us: 0,
        }
    }

    /// Give up after `polls` reads of status register 1
    ///
    /// A bound of zero still performs one read.
    pub const fn max_polls(polls: u32) -> Self {
        Self {
            max_polls: Some(if polls == 0 { 1 } else { polls }),
            poll_delay_us: 0,
        }
    }

    /// Give up after roughly `timeout_us`, polling every `poll_delay_us`
    pub const fn timeout_us(timeout_us: u32, poll_delay_us: u32) -> Self {
        let polls = if poll_delay_us > 0 {
            timeout_us / poll_delay_us
        } else {
            timeout_us
        };
        Self {
            max_polls: Some(if polls == 0 { 1 } else { polls }),
            poll_delay_us,
        }
    }

    /// Set the delay between two consecutive polls
    pub const fn with_poll_delay_us(mut self, poll_delay_us: u32) -> Self {
        self.poll_delay_us = poll_delay_us;
        self
    }

    /// Maximum number of reads, or `None` when unbounded
    pub const fn limit(&self) -> Option<u32> {
        self.max_polls
    }

    /// Delay between polls in microseconds
    pub const fn poll_delay_us(&self) -> u32 {
        self.poll_delay_us
    }
}

impl Default for BusyPoll {
    /// 500ms budget polled every 10us; status writes finish in well under that
    fn default() -> Self {
        Self::timeout_us(DEFAULT_BUSY_TIMEOUT_US, DEFAULT_POLL_DELAY_US)
    }
}

/// Wait for the WIP (Write In Progress) bit to clear
///
/// Always reads status register 1 at least once, even if the device is
/// already idle. Returns [`Error::DeviceNotReady`] once the bound in `poll`
/// is used up with the bit still set; the delay is never applied after the
/// final read.
#[maybe_async]
pub async fn wait_ready<T: SpiTransport + ?Sized>(transport: &mut T, poll: &BusyPoll) -> Result<()> {
    let mut polls: u32 = 0;

    loop {
        let status = read_status1(transport).await?;
        polls = polls.saturating_add(1);

        if status & opcodes::SR1_WIP == 0 {
            log::trace!("device ready after {} status poll(s)", polls);
            return Ok(());
        }

        if let Some(limit) = poll.max_polls {
            if polls >= limit {
                log::warn!(
                    "device still busy after {} status poll(s) (SR1=0x{:02X})",
                    polls,
                    status
                );
                return Err(Error::DeviceNotReady { polls });
            }
        }

        if poll.poll_delay_us > 0 {
            transport.delay_us(poll.poll_delay_us).await;
        }
    }
}

/// Check if a write cycle is in progress
#[maybe_async]
pub async fn is_busy<T: SpiTransport + ?Sized>(transport: &mut T) -> Result<bool> {
    let status = read_status1(transport).await?;
    Ok(status & opcodes::SR1_WIP != 0)
}
