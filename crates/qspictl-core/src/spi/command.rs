//! SPI command structure

use super::{AddressWidth, IoMode};

/// A single SPI exchange
///
/// Covers both transport shapes the mode controller needs: "send N bytes"
/// (empty `read_buf`) and "send M bytes then receive K bytes". Uses slices so
/// that building a command never allocates.
pub struct SpiCommand<'a> {
    /// The opcode byte
    pub opcode: u8,

    /// Address (if any)
    pub address: Option<u32>,

    /// Address width
    pub address_width: AddressWidth,

    /// I/O mode
    pub io_mode: IoMode,

    /// Number of dummy cycles after address
    pub dummy_cycles: u8,

    /// Data to write after opcode/address/dummy
    pub write_data: &'a [u8],

    /// Buffer to read into
    pub read_buf: &'a mut [u8],
}

impl<'a> SpiCommand<'a> {
    /// Create a simple command with no address or data (e.g., WREN)
    pub fn simple(opcode: u8) -> Self {
        Self {
            opcode,
            address: None,
            address_width: AddressWidth::None,
            io_mode: IoMode::Single,
            dummy_cycles: 0,
            write_data: &[],
            read_buf: &mut [],
        }
    }

    /// Create a read register command with no address (e.g., RDSR)
    pub fn read_reg(opcode: u8, buf: &'a mut [u8]) -> Self {
        Self {
            read_buf: buf,
            ..Self::simple(opcode)
        }
    }

    /// Create a write register command with no address (e.g., WRSR)
    pub fn write_reg(opcode: u8, data: &'a [u8]) -> Self {
        Self {
            write_data: data,
            ..Self::simple(opcode)
        }
    }

    /// Create a read command with 3-byte address
    pub fn read_3b(opcode: u8, addr: u32, buf: &'a mut [u8]) -> Self {
        Self {
            address: Some(addr),
            address_width: AddressWidth::ThreeByte,
            read_buf: buf,
            ..Self::simple(opcode)
        }
    }

    /// Set the I/O mode for this command
    pub fn with_io_mode(mut self, mode: IoMode) -> Self {
        self.io_mode = mode;
        self
    }

    /// Set the number of dummy cycles
    pub fn with_dummy_cycles(mut self, cycles: u8) -> Self {
        self.dummy_cycles = cycles;
        self
    }

    /// Returns true if this command has a read phase
    pub fn has_read(&self) -> bool {
        !self.read_buf.is_empty()
    }

    /// Number of dummy bytes clocked out after the address
    ///
    /// Dummy cycles run at the address phase width.
    pub fn dummy_bytes(&self) -> usize {
        (self.dummy_cycles as usize * self.io_mode.addr_lines() as usize) / 8
    }

    /// Length of the opcode + address + dummy header in bytes
    pub fn header_len(&self) -> usize {
        1 + self.address_width.bytes() as usize + self.dummy_bytes()
    }

    /// Encode opcode, address and dummy bytes into `buf`
    ///
    /// `buf` must be at least [`header_len`](Self::header_len) bytes long.
    pub fn encode_header(&self, buf: &mut [u8]) {
        buf[0] = self.opcode;
        let addr_len = self.address_width.bytes() as usize;
        if let Some(addr) = self.address {
            self.address_width.encode(addr, &mut buf[1..1 + addr_len]);
        }
        for b in &mut buf[1 + addr_len..self.header_len()] {
            *b = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::opcodes;

    #[test]
    fn test_write_status_header() {
        let data = [0x00, 0xFA];
        let cmd = SpiCommand::write_reg(opcodes::WRSR, &data);
        assert_eq!(cmd.header_len(), 1);
        let mut buf = [0xAAu8; 1];
        cmd.encode_header(&mut buf);
        assert_eq!(buf, [opcodes::WRSR]);
        assert!(!cmd.has_read());
    }

    #[test]
    fn test_quad_out_read_header() {
        let mut rx = [0u8; 16];
        let cmd = SpiCommand::read_3b(opcodes::QOR, 0x12_3456, &mut rx)
            .with_io_mode(IoMode::QuadOut)
            .with_dummy_cycles(8);
        // opcode + 3 address bytes + 1 dummy byte on a single line
        assert_eq!(cmd.header_len(), 5);
        let mut buf = [0xAAu8; 5];
        cmd.encode_header(&mut buf);
        assert_eq!(buf, [opcodes::QOR, 0x12, 0x34, 0x56, 0x00]);
    }
}
