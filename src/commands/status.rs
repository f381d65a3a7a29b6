//! Status command implementation

use qspictl_core::protocol;
use qspictl_core::spi::opcodes;
use qspictl_core::transport::SpiTransport;

/// Print both status registers and the bits qspictl cares about
pub fn run_status<T: SpiTransport + ?Sized>(
    transport: &mut T,
    qe_mask: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let sr1 = protocol::read_status1(transport)?;
    let sr2 = protocol::read_status2(transport)?;

    println!("Status register 1: 0x{:02X}", sr1);
    println!("Status register 2: 0x{:02X}", sr2);
    println!("  BUSY: {}", flag(sr1 & opcodes::SR1_WIP != 0));
    println!("  WEL:  {}", flag(sr1 & opcodes::SR1_WEL != 0));
    println!("  QE:   {}", flag(sr2 & qe_mask != 0));

    Ok(())
}

fn flag(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "clear"
    }
}
