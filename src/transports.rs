//! Transport registration and dispatch
//!
//! Transports are selected with a spec string, `name` or
//! `name:key=value,key=value`, and opened as boxed [`SpiTransport`]s so the
//! commands never care which backend they drive.

use qspictl_core::transport::{SpiTransport, TransportInfo};
use std::collections::HashMap;

/// Boxed transport as handed to the commands
pub type BoxedTransport = Box<dyn SpiTransport + Send>;

/// Get information about all transports enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "dummy")]
    transports.push(TransportInfo {
        name: "dummy",
        aliases: &[],
        description: "Emulated flash status registers (status1=<n>,status2=<n>,busy=<polls>,stuck=<0|1>)",
    });

    #[cfg(feature = "linux-spi")]
    transports.push(TransportInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev (dev=/dev/spidevX.Y,spispeed=<kHz>,mode=<0-3>,quad=<0|1>)",
    });

    transports
}

/// Generate a short list of transport names for CLI help
pub fn transport_names_short() -> String {
    let transports = available_transports();
    let names: Vec<&str> = transports.iter().map(|t| t.name).collect();
    names.join(", ")
}

/// Parsed transport spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportParams {
    /// Transport name as written
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl TransportParams {
    /// Parameters as borrowed pairs, sorted by key
    pub fn options(&self) -> Vec<(&str, &str)> {
        let mut opts: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        opts.sort();
        opts
    }
}

/// Parse a transport string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
pub fn parse_transport_params(s: &str) -> Result<TransportParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));
    if name.is_empty() {
        return Err("Empty transport name".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.trim().to_string(), value.trim().to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(TransportParams {
        name: name.to_string(),
        params,
    })
}

/// Open a transport from its spec string
pub fn open_transport(spec: &str) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    let params = parse_transport_params(spec)?;
    log::debug!("Opening transport {}", params.name);

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params),

        #[cfg(feature = "linux-spi")]
        "linux_spi" | "linux-spi" | "spidev" => {
            qspictl_linux_spi::open_linux_spi(&params.options())
        }

        _ => Err(format!(
            "Unknown transport: {} [available: {}]",
            params.name,
            transport_names_short()
        )
        .into()),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &TransportParams) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    use qspictl_dummy::{DummyConfig, DummyFlash};

    let mut config = DummyConfig::default();
    for (key, value) in params.options() {
        match key {
            "status1" | "sr1" => config.status1 = parse_u8(value)?,
            "status2" | "sr2" => config.status2 = parse_u8(value)?,
            "busy" => config.write_busy_polls = value.parse()?,
            "stuck" => config.stuck_busy = value == "1",
            _ => log::warn!("dummy: unknown option {}={}", key, value),
        }
    }

    log::info!(
        "dummy: emulating SR1=0x{:02X} SR2=0x{:02X}",
        config.status1,
        config.status2
    );
    Ok(Box::new(DummyFlash::new(config)))
}

#[cfg(feature = "dummy")]
fn parse_u8(s: &str) -> Result<u8, Box<dyn std::error::Error>> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => s.parse()?,
    };
    Ok(value)
}
