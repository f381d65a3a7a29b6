//! SPI NOR command sequences
//!
//! Status register access, busy polling, quad mode transitions and the quad
//! read that runs while quad mode is enabled.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async (for Embassy, tokio)

mod busy;
mod quad;
mod read;
mod status;

pub use busy::{
    is_busy, wait_ready, BusyPoll, DEFAULT_BUSY_TIMEOUT_US, DEFAULT_POLL_DELAY_US,
};
pub use quad::{enter_quad_mode, exit_quad_mode, is_quad_enabled, ModeConfig, ModeController};
pub use read::{check_quad_read_range, read_quad_out};
pub use status::{read_status1, read_status2, write_enable, write_status};

/// Scripted transport for unit tests
///
/// Emulates just enough of SR1/SR2 to drive the protocol functions, records
/// every exchange and can fail the n-th occurrence of an opcode.
#[cfg(all(test, feature = "is_sync"))]
pub(crate) mod mock {
    use crate::error::{Error, Result};
    use crate::spi::{opcodes, SpiCommand};
    use crate::transport::{SpiTransport, TransportFeatures};
    use heapless::Vec;

    pub(crate) struct MockTransport {
        pub sr1: u8,
        pub sr2: u8,
        pub log: Vec<(u8, Vec<u8, 4>), 64>,
        pub delays: u32,
        pub delayed_us: u32,
        pub features: TransportFeatures,
        busy_reads: u32,
        busy_after_write: u32,
        write_enabled: bool,
        fail: Option<(u8, u32)>,
        counts: [u32; 256],
    }

    impl MockTransport {
        pub fn new(sr1: u8, sr2: u8) -> Self {
            Self {
                sr1,
                sr2,
                log: Vec::new(),
                delays: 0,
                delayed_us: 0,
                features: TransportFeatures::QUAD_IN,
                busy_reads: 0,
                busy_after_write: 0,
                write_enabled: false,
                fail: None,
                counts: [0; 256],
            }
        }

        /// Report busy for the next `reads` SR1 reads
        pub fn busy_for(mut self, reads: u32) -> Self {
            self.busy_reads = reads;
            self
        }

        /// Report busy for `reads` SR1 reads after every status write
        pub fn busy_after_write(mut self, reads: u32) -> Self {
            self.busy_after_write = reads;
            self
        }

        /// Fail the `nth` (1-based) exchange using `opcode`
        pub fn fail_on(mut self, opcode: u8, nth: u32) -> Self {
            self.fail = Some((opcode, nth));
            self
        }

        pub fn opcodes(&self) -> Vec<u8, 64> {
            self.log.iter().map(|(op, _)| *op).collect()
        }

        pub fn count(&self, opcode: u8) -> u32 {
            self.counts[opcode as usize]
        }
    }

    impl SpiTransport for MockTransport {
        fn features(&self) -> TransportFeatures {
            self.features
        }

        fn max_read_len(&self) -> usize {
            16
        }

        fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
            let op = cmd.opcode;
            self.counts[op as usize] += 1;
            let data = Vec::from_slice(&cmd.write_data[..cmd.write_data.len().min(4)])
                .map_err(|_| Error::Transport)?;
            self.log.push((op, data)).map_err(|_| Error::Transport)?;

            if self.fail == Some((op, self.counts[op as usize])) {
                return Err(Error::Transport);
            }

            match op {
                opcodes::RDSR => {
                    let mut sr1 = self.sr1;
                    if self.busy_reads > 0 {
                        self.busy_reads -= 1;
                        sr1 |= opcodes::SR1_WIP;
                    }
                    cmd.read_buf[0] = sr1;
                }
                opcodes::RDSR2 => cmd.read_buf[0] = self.sr2,
                opcodes::WREN => self.write_enabled = true,
                opcodes::WRSR => {
                    if self.write_enabled {
                        self.sr1 = cmd.write_data[0];
                        self.sr2 = cmd.write_data[1];
                        self.busy_reads = self.busy_after_write;
                    }
                    self.write_enabled = false;
                }
                opcodes::QOR => {
                    for (i, b) in cmd.read_buf.iter_mut().enumerate() {
                        *b = (cmd.address.unwrap_or(0) as usize + i) as u8;
                    }
                }
                _ => return Err(Error::OpcodeNotSupported),
            }
            Ok(())
        }

        fn delay_us(&mut self, us: u32) {
            self.delays += 1;
            self.delayed_us += us;
        }
    }
}
