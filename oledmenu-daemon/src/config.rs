//! Daemon configuration
//!
//! Loaded from a TOML file. Every section and key is optional; missing
//! values take the defaults below, which match a stock 128x64 panel on
//! `/dev/i2c-0` with buttons on GPIO 0, 2 and 3.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use oledmenu_core::LoopTiming;
use oledmenu_display::Geometry;
use oledmenu_hal::i2c::I2cConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the config is looked for when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/oledmenu.toml";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "oledmenu")]
#[command(version)]
#[command(about = "Menu screens on an SSD1306 panel driven by three buttons", long_about = None)]
pub struct CliArgs {
    /// Path to the config file
    #[arg(value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Complete daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub display: DisplayConfig,
    pub buttons: ButtonConfig,
    pub timing: TimingConfig,
    pub network: NetworkConfig,
}

/// `[display]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// i2c-dev node the panel is on
    pub i2c_bus: String,
    /// 7-bit panel address
    pub address: u8,
    /// Characters per row
    pub columns: usize,
    /// Text rows
    pub rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            i2c_bus: "/dev/i2c-0".to_string(),
            address: 0x3C,
            columns: Geometry::FULL_PANEL.columns,
            rows: Geometry::FULL_PANEL.rows,
        }
    }
}

/// `[buttons]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// GPIO numbers of button 1, 2, 3, ... in priority order
    pub pins: Vec<u64>,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            pins: vec![0, 2, 3],
        }
    }
}

/// `[timing]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub display_off_timeout_s: f64,
    /// Poll period while the panel is off
    pub polling_interval_ms: u64,
    /// Poll period while the panel is on
    pub turbo_polling_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            display_off_timeout_s: 30.0,
            polling_interval_ms: 200,
            turbo_polling_interval_ms: 10,
        }
    }
}

/// `[network]` command timeouts, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub toggle_timeout_s: u64,
    pub connect_timeout_s: u64,
    pub scan_timeout_s: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            toggle_timeout_s: 15,
            connect_timeout_s: 100,
            scan_timeout_s: 15,
        }
    }
}

impl NetworkConfig {
    pub fn toggle_timeout(&self) -> Duration {
        Duration::from_secs(self.toggle_timeout_s)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_s)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_s)
    }
}

impl DaemonConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] if it exists
    ///
    /// A missing default file yields the defaults; a missing file that was
    /// asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load_from_file(default)
                } else {
                    log::info!("{} not found, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DaemonConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.geometry().fits_panel() {
            return Err(ConfigError::Invalid {
                field: "display",
                message: format!(
                    "{}x{} characters do not fit a 128x64 panel",
                    self.display.columns, self.display.rows
                ),
            });
        }
        if self.display.address > 0x7F {
            return Err(ConfigError::Invalid {
                field: "display.address",
                message: format!("0x{:02x} is not a 7-bit address", self.display.address),
            });
        }
        if self.buttons.pins.is_empty() {
            return Err(ConfigError::Invalid {
                field: "buttons.pins",
                message: "at least one button is required".to_string(),
            });
        }
        if self.buttons.pins.len() > usize::from(u8::MAX) {
            return Err(ConfigError::Invalid {
                field: "buttons.pins",
                message: "too many buttons".to_string(),
            });
        }
        let timing = &self.timing;
        let off_timeout = Duration::try_from_secs_f64(timing.display_off_timeout_s);
        if !matches!(off_timeout, Ok(timeout) if !timeout.is_zero()) {
            return Err(ConfigError::Invalid {
                field: "timing.display_off_timeout_s",
                message: "must be a positive number of seconds".to_string(),
            });
        }
        if timing.polling_interval_ms == 0 || timing.turbo_polling_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timing",
                message: "polling intervals must be positive".to_string(),
            });
        }
        let network = &self.network;
        if network.toggle_timeout_s == 0 || network.connect_timeout_s == 0 || network.scan_timeout_s == 0 {
            return Err(ConfigError::Invalid {
                field: "network",
                message: "timeouts must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            columns: self.display.columns,
            rows: self.display.rows,
        }
    }

    pub fn i2c(&self) -> I2cConfig {
        I2cConfig {
            address: self.display.address,
            ..I2cConfig::default()
        }
    }

    pub fn loop_timing(&self) -> LoopTiming {
        LoopTiming {
            display_off_timeout: Duration::try_from_secs_f64(self.timing.display_off_timeout_s)
                .unwrap_or(LoopTiming::default().display_off_timeout),
            polling_interval: Duration::from_millis(self.timing.polling_interval_ms),
            turbo_polling_interval: Duration::from_millis(self.timing.turbo_polling_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = DaemonConfig::default();
        config.validate().unwrap();
        assert_eq!(config.geometry(), Geometry::FULL_PANEL);
        assert_eq!(config.i2c().address, 0x3C);
        assert_eq!(config.buttons.pins, vec![0, 2, 3]);
        assert_eq!(config.loop_timing(), LoopTiming::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config(
            r#"
            [display]
            i2c_bus = "/dev/i2c-1"
            address = 61

            [timing]
            display_off_timeout_s = 12.5
            "#,
        );
        let config = DaemonConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.display.i2c_bus, "/dev/i2c-1");
        assert_eq!(config.display.address, 0x3D);
        assert_eq!(config.display.columns, 16);
        assert_eq!(config.timing.polling_interval_ms, 200);
        assert_eq!(
            config.loop_timing().display_off_timeout,
            Duration::from_millis(12_500)
        );
        assert_eq!(config.network, NetworkConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = DaemonConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_error_names_file() {
        let file = write_config("[display\ncolumns = ");
        let err = DaemonConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("cannot parse config file"));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let file = write_config("[display]\ncolumns = 20\n");
        let err = DaemonConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "display", .. }));
    }

    #[test]
    fn test_empty_buttons_rejected() {
        let file = write_config("[buttons]\npins = []\n");
        let err = DaemonConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "buttons.pins", .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = DaemonConfig::default();
        config.timing.display_off_timeout_s = 0.0;
        assert!(config.validate().is_err());

        let mut config = DaemonConfig::default();
        config.network.connect_timeout_s = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unrepresentable_timeout_rejected() {
        for seconds in [1e30, f64::INFINITY, f64::NAN, -1.0, 1e-12] {
            let mut config = DaemonConfig::default();
            config.timing.display_off_timeout_s = seconds;
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::Invalid { field: "timing.display_off_timeout_s", .. })
                ),
                "{} accepted",
                seconds
            );
        }

        let file = write_config("[timing]\ndisplay_off_timeout_s = 1e30\n");
        let err = DaemonConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = DaemonConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: DaemonConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
