//! qspictl-dummy - Emulated SPI NOR status registers
//!
//! This crate provides a dummy transport that emulates the parts of a
//! W25Q-style flash chip the quad mode controller talks to: both status
//! registers, the write-enable latch, a write cycle that keeps the busy bit
//! set for a number of polls, and a memory array for quad output reads.
//!
//! Every exchange is recorded in a transaction log, and any opcode can be made
//! to fail on its n-th occurrence. That makes it the fixture for protocol
//! tests as well as the `dummy` transport of the command-line tool.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use qspictl_core::error::{Error, Result};
use qspictl_core::spi::{check_io_mode_supported, opcodes, IoMode, SpiCommand};
use qspictl_core::transport::{SpiTransport, TransportFeatures};

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Status register 1 at power-on
    pub status1: u8,
    /// Status register 2 at power-on
    pub status2: u8,
    /// Number of SR1 reads that report busy after each accepted status write
    pub write_busy_polls: u32,
    /// Keep the busy bit set forever once a status write was accepted
    pub stuck_busy: bool,
    /// Memory array size in bytes
    pub size: usize,
    /// Largest read a single exchange may carry
    pub max_read_len: usize,
    /// Advertised wide-transfer capabilities
    pub features: TransportFeatures,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            status1: 0x00,
            status2: 0x00,
            write_busy_polls: 2,
            stuck_busy: false,
            size: 64 * 1024,
            max_read_len: 4096,
            features: TransportFeatures::QUAD_IN,
        }
    }
}

/// One recorded exchange
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Opcode byte
    pub opcode: u8,
    /// Address, for addressed commands
    pub address: Option<u32>,
    /// Bytes sent after the header
    pub write_data: Vec<u8>,
    /// Bytes returned in the read phase
    pub read_data: Vec<u8>,
    /// Data phase width
    pub io_mode: IoMode,
    /// Whether the exchange was failed by fault injection
    pub failed: bool,
}

/// Dummy flash transport
///
/// Emulates a flash chip's status registers in memory for testing purposes.
#[cfg(feature = "alloc")]
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    status_reg1: u8,
    status_reg2: u8,
    write_enabled: bool,
    busy_polls_left: u32,
    stuck: bool,
    faults: Vec<(u8, u32)>,
    counts: [u32; 256],
    log: Vec<Transaction>,
    delayed_us: u64,
}

#[cfg(feature = "alloc")]
impl DummyFlash {
    /// Create a new dummy flash with the given configuration
    ///
    /// The memory array is filled with a repeating 0x00..=0xFF pattern so
    /// reads at different addresses are distinguishable.
    pub fn new(config: DummyConfig) -> Self {
        let mut data = vec![0u8; config.size];
        for (i, b) in data.iter_mut().enumerate() {
            *b = i as u8;
        }
        Self {
            status_reg1: config.status1,
            status_reg2: config.status2,
            config,
            data,
            write_enabled: false,
            busy_polls_left: 0,
            stuck: false,
            faults: Vec::new(),
            counts: [0; 256],
            log: Vec::new(),
            delayed_us: 0,
        }
    }

    /// Create a new dummy flash with default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with the given power-on status registers
    pub fn with_status(status1: u8, status2: u8) -> Self {
        Self::new(DummyConfig {
            status1,
            status2,
            ..Default::default()
        })
    }

    /// Fail the `nth` (1-based) exchange that uses `opcode`
    ///
    /// The failing exchange is logged but has no effect on the emulated chip.
    pub fn fail_on(&mut self, opcode: u8, nth: u32) {
        self.faults.push((opcode, nth));
    }

    /// Report busy on the next `polls` SR1 reads
    pub fn set_busy(&mut self, polls: u32) {
        self.busy_polls_left = polls;
    }

    /// Status register 1 as currently stored
    pub fn status1(&self) -> u8 {
        self.status_reg1
    }

    /// Status register 2 as currently stored
    pub fn status2(&self) -> u8 {
        self.status_reg2
    }

    /// Whether the write-enable latch is set
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Every exchange executed so far, in order
    pub fn log(&self) -> &[Transaction] {
        &self.log
    }

    /// Opcodes of every exchange executed so far
    pub fn opcodes(&self) -> Vec<u8> {
        self.log.iter().map(|t| t.opcode).collect()
    }

    /// Number of exchanges that used `opcode`
    pub fn count(&self, opcode: u8) -> u32 {
        self.counts[opcode as usize]
    }

    /// Forget the transaction log and opcode counters
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.counts = [0; 256];
    }

    /// Total time spent in [`SpiTransport::delay_us`]
    pub fn delayed_us(&self) -> u64 {
        self.delayed_us
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    fn quad_enabled(&self) -> bool {
        self.status_reg2 & opcodes::SR2_QE != 0
    }

    fn read_status1(&mut self) -> u8 {
        let mut sr1 = self.status_reg1 & !opcodes::SR1_WIP;
        if self.write_enabled {
            sr1 |= opcodes::SR1_WEL;
        }
        if self.stuck {
            sr1 |= opcodes::SR1_WIP;
        } else if self.busy_polls_left > 0 {
            self.busy_polls_left -= 1;
            sr1 |= opcodes::SR1_WIP;
        }
        sr1
    }

    fn handle_write_status(&mut self, cmd: &SpiCommand<'_>) {
        // Without WREN the chip silently drops the write
        if !self.write_enabled {
            log::debug!("dummy: WRSR without WREN ignored");
            return;
        }
        if let Some(&sr1) = cmd.write_data.first() {
            self.status_reg1 = sr1 & !(opcodes::SR1_WIP | opcodes::SR1_WEL);
        }
        if let Some(&sr2) = cmd.write_data.get(1) {
            self.status_reg2 = sr2;
        }
        self.write_enabled = false;
        self.busy_polls_left = self.config.write_busy_polls;
        self.stuck = self.config.stuck_busy;
        log::trace!(
            "dummy: status now SR1=0x{:02X} SR2=0x{:02X}",
            self.status_reg1,
            self.status_reg2
        );
    }

    fn handle_quad_read(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        if cmd.io_mode != IoMode::QuadOut {
            return Err(Error::IoModeNotSupported);
        }
        check_io_mode_supported(cmd.io_mode, self.config.features)?;
        if !self.quad_enabled() {
            // IO2/IO3 are still WP#/HOLD#; there is no data to clock in
            log::warn!("dummy: quad read with QE clear");
            return Err(Error::IoModeNotSupported);
        }
        if cmd.read_buf.len() > self.config.max_read_len {
            return Err(Error::Transport);
        }

        let addr = cmd.address.unwrap_or(0) as usize;
        let len = cmd.read_buf.len();
        if addr + len > self.data.len() {
            return Err(Error::Transport);
        }
        cmd.read_buf.copy_from_slice(&self.data[addr..addr + len]);
        Ok(())
    }

    fn dispatch(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        match cmd.opcode {
            opcodes::RDSR => {
                let sr1 = self.read_status1();
                if let Some(b) = cmd.read_buf.first_mut() {
                    *b = sr1;
                }
                Ok(())
            }
            opcodes::RDSR2 => {
                if let Some(b) = cmd.read_buf.first_mut() {
                    *b = self.status_reg2;
                }
                Ok(())
            }
            opcodes::WREN => {
                self.write_enabled = true;
                Ok(())
            }
            opcodes::WRSR => {
                self.handle_write_status(cmd);
                Ok(())
            }
            opcodes::QOR => self.handle_quad_read(cmd),
            _ => Err(Error::OpcodeNotSupported),
        }
    }
}

#[cfg(feature = "alloc")]
impl SpiTransport for DummyFlash {
    fn features(&self) -> TransportFeatures {
        self.config.features
    }

    fn max_read_len(&self) -> usize {
        self.config.max_read_len
    }

    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        let opcode = cmd.opcode;
        self.counts[opcode as usize] += 1;
        let nth = self.counts[opcode as usize];
        let failed = self.faults.contains(&(opcode, nth));

        let result = if failed {
            log::debug!("dummy: injected failure on 0x{:02X} #{}", opcode, nth);
            // A WRSR consumes the latch whether or not it lands
            if opcode == opcodes::WRSR {
                self.write_enabled = false;
            }
            Err(Error::Transport)
        } else {
            self.dispatch(cmd)
        };

        self.log.push(Transaction {
            opcode,
            address: cmd.address,
            write_data: cmd.write_data.to_vec(),
            read_data: if result.is_ok() {
                cmd.read_buf.to_vec()
            } else {
                Vec::new()
            },
            io_mode: cmd.io_mode,
            failed,
        });
        result
    }

    fn delay_us(&mut self, us: u32) {
        // No real delay for in-memory operations
        self.delayed_us += us as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qspictl_core::bus::{BusAttachment, DataLines, WireMode};
    use qspictl_core::protocol::{self, BusyPoll, ModeConfig, ModeController};

    fn cfg() -> ModeConfig {
        ModeConfig::default().with_busy_poll(BusyPoll::max_polls(16))
    }

    #[test]
    fn test_enter_exit_restores_every_status_pair() {
        for sr1 in 0..=0xFFu8 {
            for sr2 in 0..=0xFFu8 {
                let mut flash = DummyFlash::with_status(sr1 & 0xFC, sr2);
                protocol::enter_quad_mode(&mut flash, &cfg()).unwrap();
                assert_eq!(flash.status2(), sr2 | opcodes::SR2_QE);
                protocol::exit_quad_mode(&mut flash, &cfg()).unwrap();

                assert_eq!(flash.status1(), sr1 & 0xFC);
                assert_eq!(flash.status2(), sr2 & !opcodes::SR2_QE);
                assert_eq!(flash.count(opcodes::WRSR), 2);
            }
        }
    }

    #[test]
    fn test_write_enable_immediately_precedes_write_status() {
        let mut flash = DummyFlash::with_status(0x00, 0x00);
        protocol::enter_quad_mode(&mut flash, &cfg()).unwrap();
        protocol::exit_quad_mode(&mut flash, &cfg()).unwrap();

        let ops = flash.opcodes();
        let wrsr: Vec<usize> = ops
            .iter()
            .enumerate()
            .filter(|&(_, &op)| op == opcodes::WRSR)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(wrsr.len(), 2);
        for i in wrsr {
            assert!(i > 0);
            assert_eq!(ops[i - 1], opcodes::WREN);
        }
    }

    #[test]
    fn test_status2_f8_scenario() {
        let mut flash = DummyFlash::with_status(0x00, 0xF8);
        protocol::enter_quad_mode(&mut flash, &cfg()).unwrap();
        protocol::exit_quad_mode(&mut flash, &cfg()).unwrap();

        let writes: Vec<&[u8]> = flash
            .log()
            .iter()
            .filter(|t| t.opcode == opcodes::WRSR)
            .map(|t| t.write_data.as_slice())
            .collect();
        assert_eq!(writes, [&[0x00, 0xFA][..], &[0x00, 0xF8][..]]);
    }

    #[test]
    fn test_status_write_without_wren_is_ignored() {
        let mut flash = DummyFlash::with_status(0x00, 0x00);
        let data = [0x00, 0x02];
        let mut cmd = SpiCommand::write_reg(opcodes::WRSR, &data);
        flash.execute(&mut cmd).unwrap();
        assert_eq!(flash.status2(), 0x00);

        protocol::write_status(&mut flash, 0x00, 0x02).unwrap();
        assert_eq!(flash.status2(), 0x02);
        assert!(!flash.write_enabled());
    }

    #[test]
    fn test_failed_status_write_drops_wren() {
        let mut flash = DummyFlash::with_status(0x00, 0x00);
        flash.fail_on(opcodes::WRSR, 1);

        assert_eq!(
            protocol::write_status(&mut flash, 0x00, 0x02),
            Err(Error::Transport)
        );
        assert!(!flash.write_enabled());

        // A later WRSR without its own WREN must still be ignored
        let data = [0x00, 0x02];
        let mut cmd = SpiCommand::write_reg(opcodes::WRSR, &data);
        flash.execute(&mut cmd).unwrap();
        assert_eq!(flash.status2(), 0x00);
        assert!(flash.log().last().is_some_and(|t| !t.failed));
    }

    #[test]
    fn test_wait_ready_polls_idle_device_once() {
        let mut flash = DummyFlash::new_default();
        protocol::wait_ready(&mut flash, &BusyPoll::unbounded()).unwrap();
        assert_eq!(flash.opcodes(), [opcodes::RDSR]);
    }

    #[test]
    fn test_wait_ready_follows_write_cycle() {
        let mut flash = DummyFlash::new(DummyConfig {
            write_busy_polls: 5,
            ..Default::default()
        });
        protocol::enter_quad_mode(&mut flash, &cfg()).unwrap();
        // one read before the write, five busy reads, one idle read
        assert_eq!(flash.count(opcodes::RDSR), 1 + 5 + 1);
    }

    #[test]
    fn test_busy_never_clears() {
        let mut flash = DummyFlash::new(DummyConfig {
            stuck_busy: true,
            ..Default::default()
        });
        let config = ModeConfig::default().with_busy_poll(BusyPoll::max_polls(9));
        let err = protocol::enter_quad_mode(&mut flash, &config).unwrap_err();

        assert_eq!(err, Error::DeviceNotReady { polls: 9 });
        // SR1 read of the read-modify-write plus exactly nine polls
        assert_eq!(flash.count(opcodes::RDSR), 1 + 9);
    }

    #[test]
    fn test_timeout_bound_delays_between_polls() {
        let mut flash = DummyFlash::new(DummyConfig {
            stuck_busy: true,
            ..Default::default()
        });
        let config = ModeConfig::default().with_busy_poll(BusyPoll::timeout_us(100, 20));
        let err = protocol::enter_quad_mode(&mut flash, &config).unwrap_err();

        assert_eq!(err, Error::DeviceNotReady { polls: 5 });
        assert_eq!(flash.delayed_us(), 4 * 20);
    }

    #[test]
    fn test_failing_status2_read_during_enter() {
        let mut flash = DummyFlash::with_status(0x00, 0x00);
        flash.fail_on(opcodes::RDSR2, 1);
        assert_eq!(
            protocol::enter_quad_mode(&mut flash, &cfg()),
            Err(Error::Transport)
        );
        assert_eq!(flash.count(opcodes::WREN), 0);
        assert_eq!(flash.count(opcodes::WRSR), 0);
    }

    #[test]
    fn test_failing_second_status2_read() {
        let mut flash = DummyFlash::with_status(0x00, 0x00);
        flash.fail_on(opcodes::RDSR2, 2);

        assert!(!protocol::is_quad_enabled(&mut flash, &cfg()).unwrap());
        assert_eq!(
            protocol::enter_quad_mode(&mut flash, &cfg()),
            Err(Error::Transport)
        );
        assert_eq!(flash.count(opcodes::WRSR), 0);
        assert_eq!(flash.status2(), 0x00);
    }

    #[test]
    fn test_failing_wren_skips_write_status() {
        let mut flash = DummyFlash::with_status(0x00, 0x00);
        flash.fail_on(opcodes::WREN, 1);
        assert_eq!(
            protocol::enter_quad_mode(&mut flash, &cfg()),
            Err(Error::Transport)
        );
        assert_eq!(flash.count(opcodes::WRSR), 0);
        assert!(flash.log().last().unwrap().failed);
    }

    #[test]
    fn test_quad_read_requires_qe() {
        let mut flash = DummyFlash::new_default();
        let mut buf = [0u8; 8];
        assert_eq!(
            protocol::read_quad_out(&mut flash, 0, &mut buf),
            Err(Error::IoModeNotSupported)
        );
    }

    #[test]
    fn test_attachment_read_quad() {
        let flash = DummyFlash::new(DummyConfig {
            max_read_len: 256,
            ..Default::default()
        });
        let mut bus =
            BusAttachment::attach("qspi01", flash, DataLines::Four, ModeController::new(cfg()))
                .unwrap();

        let mut buf = [0u8; 600];
        bus.read_quad(0x1000, &mut buf).unwrap();
        assert_eq!(bus.wire_mode(), WireMode::Single);

        let flash = bus.transport_mut();
        assert_eq!(&buf[..], &flash.data()[0x1000..0x1000 + 600]);
        assert_eq!(flash.status2() & opcodes::SR2_QE, 0);

        let reads: Vec<&Transaction> = flash
            .log()
            .iter()
            .filter(|t| t.opcode == opcodes::QOR)
            .collect();
        assert_eq!(reads.len(), 3);
        assert!(reads.iter().all(|t| t.io_mode == IoMode::QuadOut));
        assert_eq!(reads[1].address, Some(0x1100));
    }

    #[test]
    fn test_attachment_failed_exit_is_unknown() {
        let mut flash = DummyFlash::new_default();
        // second WRSR is the exit write
        flash.fail_on(opcodes::WRSR, 2);
        let mut bus =
            BusAttachment::attach("qspi01", flash, DataLines::Four, ModeController::new(cfg()))
                .unwrap();

        bus.begin_quad().unwrap();
        assert_eq!(bus.wire_mode(), WireMode::Quad);
        assert_eq!(bus.end_quad(), Err(Error::Transport));
        assert_eq!(bus.wire_mode(), WireMode::Unknown);

        let ctrl = ModeController::new(cfg());
        assert!(ctrl.is_quad_enabled(bus.transport_mut()).unwrap());
    }

    #[test]
    fn test_unknown_opcode() {
        let mut flash = DummyFlash::new_default();
        let mut buf = [0u8; 3];
        let mut cmd = SpiCommand::read_reg(0x9F, &mut buf);
        assert_eq!(flash.execute(&mut cmd), Err(Error::OpcodeNotSupported));
    }
}
