//! spidev transport options

use crate::error::{LinuxSpiError, Result};

/// Default SPI clock speed in Hz (2 MHz)
pub const DEFAULT_SPEED_HZ: u32 = 2_000_000;

/// Clock polarity/phase modes
pub mod mode {
    /// CPOL=0, CPHA=0
    pub const MODE_0: u8 = 0;
    /// CPOL=0, CPHA=1
    pub const MODE_1: u8 = 1;
    /// CPOL=1, CPHA=0
    pub const MODE_2: u8 = 2;
    /// CPOL=1, CPHA=1
    pub const MODE_3: u8 = 3;
}

/// Configuration for opening a spidev device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// SPI clock speed in Hz
    pub speed_hz: u32,
    /// SPI mode (0-3)
    pub mode: u8,
    /// Request quad-width receive from the controller
    pub quad: bool,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: mode::MODE_0,
            quad: false,
        }
    }
}

impl LinuxSpiConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the SPI clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the SPI mode (0-3)
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Enable quad-width receive
    pub fn with_quad(mut self, quad: bool) -> Self {
        self.quad = quad;
        self
    }
}

/// Parse transport options from `key=value` pairs
///
/// Accepted keys: `dev` (required), `spispeed` in kHz, `mode` (0-3) and
/// `quad` (0 or 1). Unknown keys are logged and ignored.
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxSpiConfig> {
    let mut config = LinuxSpiConfig::default();

    for &(key, value) in options {
        match key {
            "dev" => config.device = value.to_string(),
            "spispeed" => {
                let khz: u32 = value.parse().map_err(|_| {
                    LinuxSpiError::InvalidParameter(format!("spispeed={}", value))
                })?;
                if khz == 0 {
                    return Err(LinuxSpiError::InvalidParameter(
                        "spispeed must be non-zero".into(),
                    ));
                }
                config.speed_hz = khz.checked_mul(1000).ok_or_else(|| {
                    LinuxSpiError::InvalidParameter(format!("spispeed={} is too fast", value))
                })?;
            }
            "mode" => {
                config.mode = match value.parse::<u8>() {
                    Ok(m) if m <= mode::MODE_3 => m,
                    _ => {
                        return Err(LinuxSpiError::InvalidParameter(format!(
                            "mode={} (must be 0-3)",
                            value
                        )))
                    }
                };
            }
            "quad" => {
                config.quad = match value {
                    "1" | "yes" | "on" => true,
                    "0" | "no" | "off" => false,
                    _ => {
                        return Err(LinuxSpiError::InvalidParameter(format!(
                            "quad={} (must be 0 or 1)",
                            value
                        )))
                    }
                };
            }
            _ => log::warn!("linux_spi: unknown option {}={}", key, value),
        }
    }

    if config.device.is_empty() {
        return Err(LinuxSpiError::NoDevice);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse_options(&[("dev", "/dev/spidev0.0")]).unwrap();
        assert_eq!(config, LinuxSpiConfig::new("/dev/spidev0.0"));
        assert_eq!(config.speed_hz, 2_000_000);
        assert!(!config.quad);
    }

    #[test]
    fn test_all_options() {
        let config = parse_options(&[
            ("dev", "/dev/spidev1.2"),
            ("spispeed", "30000"),
            ("mode", "3"),
            ("quad", "1"),
        ])
        .unwrap();
        assert_eq!(
            config,
            LinuxSpiConfig::new("/dev/spidev1.2")
                .with_speed(30_000_000)
                .with_mode(3)
                .with_quad(true)
        );
    }

    #[test]
    fn test_missing_device() {
        assert!(matches!(
            parse_options(&[("quad", "1")]),
            Err(LinuxSpiError::NoDevice)
        ));
    }

    #[test]
    fn test_bad_values() {
        let dev = ("dev", "/dev/spidev0.0");
        for bad in [
            ("mode", "4"),
            ("mode", "x"),
            ("spispeed", "0"),
            ("spispeed", "fast"),
            ("spispeed", "5000000"),
            ("quad", "2"),
        ] {
            assert!(
                matches!(
                    parse_options(&[dev, bad]),
                    Err(LinuxSpiError::InvalidParameter(_))
                ),
                "{:?} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_unknown_option_ignored() {
        let config = parse_options(&[("dev", "/dev/spidev0.0"), ("cs", "1")]).unwrap();
        assert_eq!(config.device, "/dev/spidev0.0");
    }
}
