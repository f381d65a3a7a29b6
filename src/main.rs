//! qspictl - SPI NOR quad mode control
//!
//! Switches SPI NOR flash chips between single-wire and quad-wire operation
//! through the Quad Enable bit of status register 2, and reads them with
//! quad output reads while quad mode is on.
//!
//! All protocol work lives in `qspictl-core`; this binary only opens a
//! transport from a spec string, builds the transition configuration from
//! the command line or a board file, and reports the result.

mod cli;
mod commands;
mod transports;

use clap::Parser;
use cli::{Cli, Commands};
use qspictl_core::bus::{BusAttachment, DataLines};
use qspictl_core::protocol::ModeController;

/// Log level for the `-v` count, if it raises the default
fn verbosity_level(verbose: u8) -> Option<log::LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG applies unless -v/-vv asks for more
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = verbosity_level(cli.verbose) {
        logger.filter_level(level);
    }
    logger.init();

    match cli.command {
        Commands::Status { transport } => {
            let mut t = transports::open_transport(&transport)?;
            commands::run_status(&mut t, qspictl_core::spi::opcodes::SR2_QE)
        }
        Commands::QuadEnable { transport, mode } => {
            let config = commands::mode_config(&mode)?;
            let mut t = transports::open_transport(&transport)?;
            commands::run_quad_enable(&mut t, &config)
        }
        Commands::QuadDisable { transport, mode } => {
            let config = commands::mode_config(&mode)?;
            let mut t = transports::open_transport(&transport)?;
            commands::run_quad_disable(&mut t, &config)
        }
        Commands::Read {
            transport,
            addr,
            length,
            output,
            name,
            mode,
        } => {
            let controller = ModeController::new(commands::mode_config(&mode)?);
            let t = transports::open_transport(&transport)?;
            let mut bus = BusAttachment::attach(&name, t, DataLines::Four, controller)?;
            commands::run_read(&mut bus, addr, length as usize, &output)
        }
        Commands::Board { config } => commands::run_board(&config),
        Commands::ListTransports => {
            commands::list_transports();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        assert_eq!(verbosity_level(0), None);
        assert_eq!(verbosity_level(1), Some(log::LevelFilter::Debug));
        assert_eq!(verbosity_level(2), Some(log::LevelFilter::Trace));
        assert_eq!(verbosity_level(5), Some(log::LevelFilter::Trace));
    }

    #[test]
    fn test_verbose_flag_raises_filter() {
        let cli = Cli::try_parse_from(["qspictl", "-v", "list-transports"]).unwrap();
        let level = verbosity_level(cli.verbose).unwrap();

        let logger = env_logger::Builder::new().filter_level(level).build();
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }
}
