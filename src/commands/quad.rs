//! Quad enable/disable command implementation

use crate::cli::ModeArgs;
use qspictl_core::config::BusyPollConfig;
use qspictl_core::protocol::{self, ModeConfig};
use qspictl_core::transport::SpiTransport;

/// Build the transition configuration from command-line options
pub fn mode_config(args: &ModeArgs) -> Result<ModeConfig, Box<dyn std::error::Error>> {
    let busy_poll = BusyPollConfig {
        max_polls: args.max_polls,
        timeout_us: args.timeout_us,
        poll_delay_us: args.poll_delay_us,
        unbounded: false,
    }
    .to_busy_poll()?;

    Ok(ModeConfig {
        qe_mask: args.qe_mask,
        busy_poll,
    })
}

/// Set the Quad Enable bit
pub fn run_quad_enable<T: SpiTransport + ?Sized>(
    transport: &mut T,
    config: &ModeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    protocol::enter_quad_mode(transport, config)?;
    report(transport, config)
}

/// Clear the Quad Enable bit
pub fn run_quad_disable<T: SpiTransport + ?Sized>(
    transport: &mut T,
    config: &ModeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    protocol::exit_quad_mode(transport, config)?;
    report(transport, config)
}

fn report<T: SpiTransport + ?Sized>(
    transport: &mut T,
    config: &ModeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let enabled = protocol::is_quad_enabled(transport, config)?;
    println!(
        "Quad mode: {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}
