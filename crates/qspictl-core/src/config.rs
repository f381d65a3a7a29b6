//! Board configuration files
//!
//! Describes which flash devices sit on which bus, in TOML:
//!
//! ```toml
//! [[flash]]
//! bus = "qspi0"
//! device = "qspi01"
//! data_lines = 4
//! transport = "linux_spi:dev=/dev/spidev0.0,quad=1"
//! qe_mask = "0x02"
//!
//! [flash.busy_poll]
//! timeout_us = 500000
//! poll_delay_us = 10
//! ```
//!
//! `busy_poll` accepts either `max_polls`, `timeout_us` or `unbounded = true`.
//! Everything except `bus`, `device` and `transport` is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::string::{String, ToString};
use std::vec::Vec;
use std::{format, vec};

use crate::bus::{DataLines, MAX_NAME_LEN};
use crate::protocol::{BusyPoll, ModeConfig, DEFAULT_BUSY_TIMEOUT_US, DEFAULT_POLL_DELAY_US};
use crate::spi::opcodes;

/// Errors loading a board configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML or has the wrong shape
    #[error("failed to parse board config: {0}")]
    Parse(#[from] toml::de::Error),

    /// File parsed but a value is out of range
    #[error("invalid board config: {0}")]
    Invalid(String),
}

/// Board configuration: every attached flash device
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    /// Attached flash devices
    #[serde(default)]
    pub flash: Vec<FlashAttachConfig>,
}

/// One flash device attached to a bus
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashAttachConfig {
    /// Bus the device sits on (e.g. "qspi0")
    pub bus: String,
    /// Attachment name (e.g. "qspi01")
    pub device: String,
    /// Wired data lines: 1, 2 or 4
    #[serde(default = "default_data_lines")]
    pub data_lines: u8,
    /// Transport spec, "name" or "name:key=value,..."
    pub transport: String,
    /// Quad Enable mask in status register 2
    #[serde(default = "default_qe_mask", deserialize_with = "deserialize_hex_u8")]
    pub qe_mask: u8,
    /// Busy wait bound after status writes
    #[serde(default)]
    pub busy_poll: BusyPollConfig,
}

/// Busy wait bound as written in the config file
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusyPollConfig {
    /// Give up after this many status reads
    pub max_polls: Option<u32>,
    /// Give up after roughly this many microseconds
    pub timeout_us: Option<u32>,
    /// Delay between status reads
    pub poll_delay_us: Option<u32>,
    /// Never give up
    #[serde(default)]
    pub unbounded: bool,
}

fn default_data_lines() -> u8 {
    4
}

fn default_qe_mask() -> u8 {
    opcodes::SR2_QE
}

/// Deserialize a u8 that can be an integer or a hex (0x...) / decimal string
fn deserialize_hex_u8<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(i64),
        Str(String),
    }

    let value = match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => n,
        HexOrInt::Str(s) => parse_number(&s).map_err(serde::de::Error::custom)?,
    };
    u8::try_from(value).map_err(|_| serde::de::Error::custom(format!("{} does not fit in a byte", value)))
}

/// Parse a number that can be hex (0x...) or decimal
fn parse_number(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

impl BusyPollConfig {
    /// Convert to the poller's bound
    pub fn to_busy_poll(&self) -> Result<BusyPoll, ConfigError> {
        let delay = self.poll_delay_us;
        match (self.unbounded, self.max_polls, self.timeout_us) {
            (true, None, None) => Ok(BusyPoll::unbounded().with_poll_delay_us(delay.unwrap_or(0))),
            (false, Some(polls), None) => {
                Ok(BusyPoll::max_polls(polls).with_poll_delay_us(delay.unwrap_or(0)))
            }
            (false, None, Some(timeout)) => Ok(BusyPoll::timeout_us(
                timeout,
                delay.unwrap_or(DEFAULT_POLL_DELAY_US),
            )),
            (false, None, None) => Ok(BusyPoll::timeout_us(
                DEFAULT_BUSY_TIMEOUT_US,
                delay.unwrap_or(DEFAULT_POLL_DELAY_US),
            )),
            _ => Err(ConfigError::Invalid(
                "busy_poll takes only one of max_polls, timeout_us, unbounded".to_string(),
            )),
        }
    }
}

impl FlashAttachConfig {
    /// Wired data lines
    pub fn data_lines(&self) -> Result<DataLines, ConfigError> {
        DataLines::from_count(self.data_lines).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "{}: data_lines must be 1, 2 or 4, got {}",
                self.device, self.data_lines
            ))
        })
    }

    /// Mode controller configuration for this device
    pub fn mode_config(&self) -> Result<ModeConfig, ConfigError> {
        Ok(ModeConfig {
            qe_mask: self.qe_mask,
            busy_poll: self.busy_poll.to_busy_poll()?,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.is_empty() || self.device.len() > MAX_NAME_LEN {
            return Err(ConfigError::Invalid(format!(
                "device name '{}' must be 1-{} bytes",
                self.device, MAX_NAME_LEN
            )));
        }
        if self.qe_mask == 0 {
            return Err(ConfigError::Invalid(format!(
                "{}: qe_mask must not be zero",
                self.device
            )));
        }
        if self.transport.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{}: transport is empty",
                self.device
            )));
        }
        self.data_lines()?;
        self.mode_config()?;
        Ok(())
    }
}

impl BoardConfig {
    /// Parse and validate a board configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = toml::from_str(content)?;

        let mut seen: Vec<&str> = vec![];
        for flash in &config.flash {
            flash.validate()?;
            if seen.contains(&flash.device.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "device '{}' is attached twice",
                    flash.device
                )));
            }
            seen.push(&flash.device);
        }

        Ok(config)
    }

    /// Load a board configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Find an attached device by name
    pub fn device(&self, name: &str) -> Option<&FlashAttachConfig> {
        self.flash.iter().find(|f| f.device == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"
[[flash]]
bus = "qspi0"
device = "qspi01"
data_lines = 4
transport = "dummy"
qe_mask = "0x02"

[flash.busy_poll]
max_polls = 1000
poll_delay_us = 5

[[flash]]
bus = "spi1"
device = "spi10"
data_lines = 1
transport = "linux_spi:dev=/dev/spidev1.0"
"#;

    #[test]
    fn test_parse_board() {
        let board = BoardConfig::from_toml_str(BOARD).unwrap();
        assert_eq!(board.flash.len(), 2);

        let qspi = board.device("qspi01").unwrap();
        assert_eq!(qspi.bus, "qspi0");
        assert_eq!(qspi.data_lines().unwrap(), DataLines::Four);
        let mode = qspi.mode_config().unwrap();
        assert_eq!(mode.qe_mask, 0x02);
        assert_eq!(mode.busy_poll, BusyPoll::max_polls(1000).with_poll_delay_us(5));

        let spi = board.device("spi10").unwrap();
        assert_eq!(spi.data_lines().unwrap(), DataLines::One);
        assert_eq!(spi.mode_config().unwrap(), ModeConfig::default());
    }

    #[test]
    fn test_integer_qe_mask_and_timeout() {
        let board = BoardConfig::from_toml_str(
            r#"
[[flash]]
bus = "qspi0"
device = "qspi01"
transport = "dummy"
qe_mask = 0x80
busy_poll = { timeout_us = 1000, poll_delay_us = 100 }
"#,
        )
        .unwrap();
        let mode = board.flash[0].mode_config().unwrap();
        assert_eq!(mode.qe_mask, 0x80);
        assert_eq!(mode.busy_poll.limit(), Some(10));
        assert_eq!(board.flash[0].data_lines, 4);
    }

    #[test]
    fn test_unbounded_poll() {
        let cfg = BusyPollConfig {
            unbounded: true,
            ..Default::default()
        };
        assert_eq!(cfg.to_busy_poll().unwrap().limit(), None);
    }

    #[test]
    fn test_conflicting_poll_bounds() {
        let cfg = BusyPollConfig {
            max_polls: Some(10),
            timeout_us: Some(100),
            ..Default::default()
        };
        assert!(matches!(cfg.to_busy_poll(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_lines = r#"
[[flash]]
bus = "qspi0"
device = "qspi01"
data_lines = 3
transport = "dummy"
"#;
        assert!(matches!(
            BoardConfig::from_toml_str(bad_lines),
            Err(ConfigError::Invalid(_))
        ));

        let bad_mask = r#"
[[flash]]
bus = "qspi0"
device = "qspi01"
transport = "dummy"
qe_mask = "0x100"
"#;
        assert!(matches!(
            BoardConfig::from_toml_str(bad_mask),
            Err(ConfigError::Parse(_))
        ));

        let duplicate = r#"
[[flash]]
bus = "qspi0"
device = "qspi01"
transport = "dummy"

[[flash]]
bus = "qspi1"
device = "qspi01"
transport = "dummy"
"#;
        assert!(matches!(
            BoardConfig::from_toml_str(duplicate),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0x1F"), Ok(31));
        assert_eq!(parse_number(" 42 "), Ok(42));
        assert!(parse_number("0xZZ").is_err());
    }
}
