//! Driver configuration
//!
//! Loaded with figment in priority order: built-in defaults, then an optional
//! YAML file, then `HACKLET_` environment variables (`__` separates nested
//! keys, e.g. `HACKLET_SERIAL__PORT=/dev/ttyUSB1`).

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{DongleError, Result};
use crate::transport::SerialTransportConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "HACKLET_";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set
    pub level: String,
    /// Log every TX/RX record as hex pairs
    pub log_packets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_packets: true,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DongleConfig {
    pub serial: SerialTransportConfig,
    pub logging: LoggingConfig,
}

impl DongleConfig {
    /// Figment with defaults, the optional YAML file and the environment merged
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(DongleConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate configuration
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(DongleError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        let config: DongleConfig = Self::figment(path).extract()?;
        config.validate()?;
        debug!(
            "Loaded config: port={} baud={}",
            config.serial.port, config.serial.baud_rate
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.serial
            .validate()
            .map_err(|e| DongleError::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = DongleConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, DongleConfig::default());
            assert_eq!(config.serial.baud_rate, 115_200);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        Jail::expect_with(|_jail| {
            let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
            writeln!(
                file,
                "serial:\n  port: /dev/ttyACM3\n  read_timeout_ms: 500\nlogging:\n  log_packets: false"
            )
            .unwrap();

            let config = DongleConfig::load(Some(file.path())).map_err(|e| e.to_string())?;
            assert_eq!(config.serial.port, "/dev/ttyACM3");
            assert_eq!(config.serial.read_timeout_ms, 500);
            assert_eq!(config.serial.baud_rate, 115_200);
            assert!(!config.logging.log_packets);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("hacklet.yaml", "serial:\n  port: /dev/ttyACM3\n")?;
            jail.set_env("HACKLET_SERIAL__PORT", "/dev/ttyUSB7");
            jail.set_env("HACKLET_LOGGING__LEVEL", "debug");

            let config = DongleConfig::load(Some(Path::new("hacklet.yaml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.serial.port, "/dev/ttyUSB7");
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("HACKLET_SERIAL__BAUD_RATE", "0");
            let err = DongleConfig::load(None).unwrap_err();
            assert!(matches!(err, DongleError::Config(_)));
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = DongleConfig::load(Some(Path::new("/nonexistent/hacklet.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
