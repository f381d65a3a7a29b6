//! Board command implementation

use crate::transports;
use qspictl_core::bus::BusAttachment;
use qspictl_core::config::{BoardConfig, FlashAttachConfig};
use qspictl_core::protocol::ModeController;
use std::path::Path;

/// Attach every device of a board file and report its quad state
pub fn run_board(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let board = BoardConfig::from_file(path)?;
    log::info!("Loaded {} device(s) from {:?}", board.flash.len(), path);

    println!(
        "{:<10} {:<16} {:>5} {:>8}  {}",
        "Bus", "Device", "Lines", "QE", "Transport"
    );
    println!("{}", "-".repeat(64));

    let mut failed = 0;
    for flash in &board.flash {
        let state = match query_device(flash) {
            Ok(true) => "enabled".to_string(),
            Ok(false) => "disabled".to_string(),
            Err(e) => {
                log::error!("{}: {}", flash.device, e);
                failed += 1;
                "error".to_string()
            }
        };
        println!(
            "{:<10} {:<16} {:>5} {:>8}  {}",
            flash.bus, flash.device, flash.data_lines, state, flash.transport
        );
    }

    if failed > 0 {
        return Err(format!("{} device(s) could not be queried", failed).into());
    }
    Ok(())
}

fn query_device(flash: &FlashAttachConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let controller = ModeController::new(flash.mode_config()?);
    let transport = transports::open_transport(&flash.transport)?;
    let mut bus =
        BusAttachment::attach(&flash.device, transport, flash.data_lines()?, controller)?;
    Ok(controller.is_quad_enabled(bus.transport_mut())?)
}
