//! Quad output read
//!
//! Only valid while the device has quad mode enabled; a bus attachment
//! brackets it with the enter/exit hooks.

use crate::error::{Error, Result};
use crate::spi::{opcodes, AddressWidth, IoMode, SpiCommand};
use crate::transport::SpiTransport;
use maybe_async::maybe_async;

/// Check that a quad read of `len` bytes at `addr` fits the 3-byte address space
pub fn check_quad_read_range(addr: u32, len: usize) -> Result<()> {
    if AddressWidth::ThreeByte.covers(addr, len) {
        Ok(())
    } else {
        log::debug!("quad read of {} bytes at 0x{:08X} out of range", len, addr);
        Err(Error::AddressOutOfRange)
    }
}

/// Read data using Quad Output mode (1-1-4) with 3-byte address
///
/// Uses opcode 0x6B with 8 dummy cycles, split into chunks of the
/// transport's maximum read length. Reads reaching past 16 MiB fail with
/// [`Error::AddressOutOfRange`] before anything is sent.
#[maybe_async]
pub async fn read_quad_out<T: SpiTransport + ?Sized>(
    transport: &mut T,
    addr: u32,
    buf: &mut [u8],
) -> Result<()> {
    check_quad_read_range(addr, buf.len())?;

    let max_len = transport.max_read_len().max(1);
    let mut chunk_addr = addr;

    for chunk in buf.chunks_mut(max_len) {
        let chunk_len = chunk.len() as u32;
        let mut cmd = SpiCommand::read_3b(opcodes::QOR, chunk_addr, chunk)
            .with_io_mode(IoMode::QuadOut)
            .with_dummy_cycles(opcodes::QOR_DUMMY_CYCLES);
        transport.execute(&mut cmd).await?;
        chunk_addr = chunk_addr
            .checked_add(chunk_len)
            .ok_or(Error::AddressOutOfRange)?;
    }

    Ok(())
}

#[cfg(all(test, feature = "is_sync"))]
mod tests {
    use super::*;
    use crate::protocol::mock::MockTransport;

    #[test]
    fn test_read_chunks_follow_address() {
        let mut t = MockTransport::new(0x00, 0x02);
        let mut buf = [0u8; 32];
        read_quad_out(&mut t, 0x00FF_FFE0, &mut buf).unwrap();

        assert_eq!(t.count(opcodes::QOR), 2);
        // Mock data is the low address byte
        for (i, b) in buf.iter().enumerate() {
            assert_eq!(*b, 0xE0u8.wrapping_add(i as u8));
        }
    }

    #[test]
    fn test_read_up_to_top_of_address_space() {
        let mut t = MockTransport::new(0x00, 0x02);
        let mut buf = [0u8; 8];
        read_quad_out(&mut t, 0x00FF_FFF8, &mut buf).unwrap();
        assert_eq!(buf, [0xF8, 0xF9, 0xFA, 0xFB, 0xFC, 0xFD, 0xFE, 0xFF]);
    }

    #[test]
    fn test_read_past_16mib_rejected() {
        let mut t = MockTransport::new(0x00, 0x02);

        let mut buf = [0u8; 16];
        assert_eq!(
            read_quad_out(&mut t, 0x00FF_FFF8, &mut buf),
            Err(Error::AddressOutOfRange)
        );

        let mut buf = [0u8; 8];
        assert_eq!(
            read_quad_out(&mut t, 0x0100_0000, &mut buf),
            Err(Error::AddressOutOfRange)
        );

        // Would wrap a u32 address
        let mut buf = [0u8; 16];
        assert_eq!(
            read_quad_out(&mut t, 0xFFFF_FFF8, &mut buf),
            Err(Error::AddressOutOfRange)
        );

        assert!(t.log.is_empty());
    }

    #[test]
    fn test_empty_read_sends_nothing() {
        let mut t = MockTransport::new(0x00, 0x02);
        read_quad_out(&mut t, 0, &mut []).unwrap();
        assert!(t.log.is_empty());
    }
}
