//! SPI NOR opcodes and status register bits
//!
//! Bit-exact values for the status-register command set and the quad read
//! used through a bus attachment.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any write-type command
pub const WREN: u8 = 0x06;

// ============================================================================
// Status register operations
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read Status Register 2
pub const RDSR2: u8 = 0x35;
/// Write Status Register (SR1, optionally followed by SR2)
pub const WRSR: u8 = 0x01;

// ============================================================================
// Quad read
// ============================================================================

/// Quad Output Fast Read (1-1-4), 3-byte address
pub const QOR: u8 = 0x6B;
/// Dummy cycles between address and data for [`QOR`]
pub const QOR_DUMMY_CYCLES: u8 = 8;

// ============================================================================
// Status register bit definitions
// ============================================================================

/// Status Register 1: Write In Progress / Busy
pub const SR1_WIP: u8 = 0x01;
/// Status Register 1: Write Enable Latch
pub const SR1_WEL: u8 = 0x02;

/// Status Register 2: Quad Enable
pub const SR2_QE: u8 = 0x02;
