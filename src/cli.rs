//! CLI argument parsing

use crate::transports;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a byte mask as hex or decimal, rejecting zero
fn parse_mask(s: &str) -> Result<u8, String> {
    let value = parse_hex_u32(s)?;
    match u8::try_from(value) {
        Ok(0) => Err("Mask must not be zero".to_string()),
        Ok(mask) => Ok(mask),
        Err(_) => Err(format!("Mask 0x{:X} does not fit in a byte", value)),
    }
}

/// Generate dynamic help text for the transport argument
fn transport_help() -> String {
    format!(
        "Transport to use [available: {}]",
        transports::transport_names_short()
    )
}

#[derive(Parser)]
#[command(name = "qspictl")]
#[command(author, version, about = "SPI NOR quad mode control", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Quad mode transition options shared across commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ModeArgs {
    /// Give up waiting for the busy bit after this many status reads
    #[arg(long, conflicts_with = "timeout_us")]
    pub max_polls: Option<u32>,

    /// Give up waiting for the busy bit after roughly this many microseconds
    #[arg(long)]
    pub timeout_us: Option<u32>,

    /// Delay between busy polls in microseconds
    #[arg(long)]
    pub poll_delay_us: Option<u32>,

    /// Quad Enable mask in status register 2
    #[arg(long, default_value = "0x02", value_parser = parse_mask)]
    pub qe_mask: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the status registers
    Status {
        /// Transport to use
        #[arg(short, long, help = transport_help())]
        transport: String,
    },

    /// Set the Quad Enable bit
    QuadEnable {
        /// Transport to use
        #[arg(short, long, help = transport_help())]
        transport: String,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Clear the Quad Enable bit
    QuadDisable {
        /// Transport to use
        #[arg(short, long, help = transport_help())]
        transport: String,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Read flash contents with quad output reads
    Read {
        /// Transport to use
        #[arg(short, long, help = transport_help())]
        transport: String,

        /// Start address (hex or decimal)
        #[arg(long, default_value = "0", value_parser = parse_hex_u32)]
        addr: u32,

        /// Number of bytes to read (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32)]
        length: u32,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Attachment name used in log messages
        #[arg(long, default_value = "qspi01")]
        name: String,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Show the devices of a board file and their quad state
    Board {
        /// Board configuration file (TOML format)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// List available transports
    ListTransports,
}
