//! Status register access
//!
//! Single-byte command/response exchanges for reading SR1/SR2 and the
//! write-enable + write-status pair that persists both bytes.

use crate::error::Result;
use crate::spi::{opcodes, SpiCommand};
use crate::transport::SpiTransport;
use maybe_async::maybe_async;

/// Read status register 1
#[maybe_async]
pub async fn read_status1<T: SpiTransport + ?Sized>(transport: &mut T) -> Result<u8> {
    let mut buf = [0u8; 1];
    let mut cmd = SpiCommand::read_reg(opcodes::RDSR, &mut buf);
    transport.execute(&mut cmd).await?;
    Ok(buf[0])
}

/// Read status register 2
#[maybe_async]
pub async fn read_status2<T: SpiTransport + ?Sized>(transport: &mut T) -> Result<u8> {
    let mut buf = [0u8; 1];
    let mut cmd = SpiCommand::read_reg(opcodes::RDSR2, &mut buf);
    transport.execute(&mut cmd).await?;
    Ok(buf[0])
}

/// Send the Write Enable command
#[maybe_async]
pub async fn write_enable<T: SpiTransport + ?Sized>(transport: &mut T) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::WREN);
    transport.execute(&mut cmd).await
}

/// Write status registers 1 and 2 together
///
/// Sends WREN as its own exchange, then a single WRSR exchange carrying both
/// bytes. The device ignores WRSR unless it directly follows WREN, so nothing
/// else may be issued in between. If WREN fails the write is not attempted.
///
/// This does not wait for the write cycle; see [`wait_ready`](super::wait_ready).
#[maybe_async]
pub async fn write_status<T: SpiTransport + ?Sized>(
    transport: &mut T,
    sr1: u8,
    sr2: u8,
) -> Result<()> {
    write_enable(transport).await?;
    let data = [sr1, sr2];
    let mut cmd = SpiCommand::write_reg(opcodes::WRSR, &data);
    transport.execute(&mut cmd).await
}
