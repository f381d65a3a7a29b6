//! Address width types

/// Address width for SPI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// No address phase (register commands)
    #[default]
    None,
    /// 3-byte (24-bit) address - supports up to 16 MiB
    ThreeByte,
}

impl AddressWidth {
    /// Returns the number of address bytes
    pub const fn bytes(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::ThreeByte => 3,
        }
    }

    /// Number of addressable bytes
    pub const fn space(&self) -> u64 {
        match self {
            Self::None => 0,
            Self::ThreeByte => 1 << 24,
        }
    }

    /// Check that `len` bytes starting at `address` are addressable
    pub const fn covers(&self, address: u32, len: usize) -> bool {
        match (address as u64).checked_add(len as u64) {
            Some(end) => end <= self.space(),
            None => false,
        }
    }

    /// Encode an address into bytes, most significant byte first
    pub fn encode(&self, address: u32, buf: &mut [u8]) {
        match self {
            Self::None => {}
            Self::ThreeByte => {
                buf[0] = (address >> 16) as u8;
                buf[1] = (address >> 8) as u8;
                buf[2] = address as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_byte_coverage() {
        let w = AddressWidth::ThreeByte;
        assert!(w.covers(0, 1 << 24));
        assert!(w.covers(0x00FF_FFF8, 8));
        assert!(!w.covers(0x00FF_FFF8, 16));
        assert!(!w.covers(0x0100_0000, 1));
        assert!(!w.covers(u32::MAX, usize::MAX));
    }
}
