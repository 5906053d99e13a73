//! Serial Transport Implementation
//!
//! Serial port transport for the dongle. The device enumerates as a USB serial
//! adapter and talks 115200 baud 8N1 with no flow control.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, info, warn};

use super::traits::{Transport, TransportError, TransportStats};

/// Serial port configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialTransportConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0", "COM1")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (5, 6, 7, 8)
    pub data_bits: u8,
    /// Stop bits (1, 2)
    pub stop_bits: u8,
    /// Parity ("None", "Even", "Odd")
    pub parity: String,
    /// Flow control ("None", "Software", "Hardware")
    pub flow_control: String,
    /// Read timeout for a single exchange, in milliseconds
    pub read_timeout_ms: u64,
    /// Write timeout for a single exchange, in milliseconds
    pub write_timeout_ms: u64,
}

impl Default for SerialTransportConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            data_bits: 8,
            stop_bits: 1,
            parity: "None".to_string(),
            flow_control: "None".to_string(),
            read_timeout_ms: 2000,
            write_timeout_ms: 1000,
        }
    }
}

impl SerialTransportConfig {
    /// Create a configuration for `port` with the dongle's line settings
    pub fn for_port(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Default::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.port.is_empty() {
            return Err(TransportError::ConfigError(
                "Port path cannot be empty".to_string(),
            ));
        }

        if self.baud_rate == 0 {
            return Err(TransportError::ConfigError(
                "Baud rate must be greater than zero".to_string(),
            ));
        }

        if ![5, 6, 7, 8].contains(&self.data_bits) {
            return Err(TransportError::ConfigError(
                "Data bits must be 5, 6, 7, or 8".to_string(),
            ));
        }

        if ![1, 2].contains(&self.stop_bits) {
            return Err(TransportError::ConfigError(
                "Stop bits must be 1 or 2".to_string(),
            ));
        }

        if !["None", "Even", "Odd"].contains(&self.parity.as_str()) {
            return Err(TransportError::ConfigError(
                "Parity must be None, Even, or Odd".to_string(),
            ));
        }

        if !["None", "Software", "Hardware"].contains(&self.flow_control.as_str()) {
            return Err(TransportError::ConfigError(
                "Flow control must be None, Software, or Hardware".to_string(),
            ));
        }

        if self.read_timeout_ms == 0 || self.write_timeout_ms == 0 {
            return Err(TransportError::ConfigError(
                "Timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    fn parse_parity(&self) -> tokio_serial::Parity {
        match self.parity.as_str() {
            "Even" => tokio_serial::Parity::Even,
            "Odd" => tokio_serial::Parity::Odd,
            _ => tokio_serial::Parity::None,
        }
    }

    fn parse_flow_control(&self) -> tokio_serial::FlowControl {
        match self.flow_control.as_str() {
            "Software" => tokio_serial::FlowControl::Software,
            "Hardware" => tokio_serial::FlowControl::Hardware,
            _ => tokio_serial::FlowControl::None,
        }
    }

    fn parse_data_bits(&self) -> tokio_serial::DataBits {
        match self.data_bits {
            5 => tokio_serial::DataBits::Five,
            6 => tokio_serial::DataBits::Six,
            7 => tokio_serial::DataBits::Seven,
            _ => tokio_serial::DataBits::Eight,
        }
    }

    fn parse_stop_bits(&self) -> tokio_serial::StopBits {
        match self.stop_bits {
            2 => tokio_serial::StopBits::Two,
            _ => tokio_serial::StopBits::One,
        }
    }
}

/// Serial transport implementation
#[derive(Debug)]
pub struct SerialTransport {
    config: SerialTransportConfig,
    /// `None` once the port has been closed
    port: Option<SerialStream>,
    stats: TransportStats,
}

impl SerialTransport {
    /// Open the serial port described by `config`
    pub fn open(config: SerialTransportConfig) -> Result<Self, TransportError> {
        config.validate()?;

        debug!("Opening serial port: {} @{}baud", config.port, config.baud_rate);

        let port_result = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(config.parse_data_bits())
            .parity(config.parse_parity())
            .stop_bits(config.parse_stop_bits())
            .flow_control(config.parse_flow_control())
            .timeout(config.read_timeout())
            .open_native_async();

        match port_result {
            Ok(port) => {
                info!("Opened serial port: {}", config.port);
                Ok(Self {
                    config,
                    port: Some(port),
                    stats: TransportStats::new(),
                })
            },
            Err(e) => {
                let error_msg = format!("Failed to open serial port {}: {e}", config.port);
                error!("{error_msg}");
                Err(TransportError::ConnectionFailed(error_msg))
            },
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.config.port
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let write_timeout = self.config.write_timeout();
        let port = self.port.as_mut().ok_or(TransportError::NotConnected)?;

        let send_operation = async {
            port.write_all(data).await?;
            port.flush().await
        };

        match timeout(write_timeout, send_operation).await {
            Ok(Ok(())) => {
                self.stats.record_sent(data.len());
                debug!("Serial TX: {}B", data.len());
                Ok(())
            },
            Ok(Err(e)) => {
                error!("Serial TX: {}", e);
                Err(TransportError::SendFailed(format!("Serial send error: {e}")))
            },
            Err(_) => {
                warn!("Serial TX timeout after {:?}", write_timeout);
                Err(TransportError::Timeout(format!(
                    "Send operation timed out after {write_timeout:?}"
                )))
            },
        }
    }

    async fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        let read_timeout = self.config.read_timeout();
        let port = self.port.as_mut().ok_or(TransportError::NotConnected)?;

        let mut buffer = vec![0u8; len];
        match timeout(read_timeout, port.read_exact(&mut buffer)).await {
            Ok(Ok(_)) => {
                self.stats.record_received(len);
                debug!("Serial RX: {}B", len);
                Ok(buffer)
            },
            Ok(Err(e)) => {
                error!("Serial RX: {}", e);
                Err(TransportError::ReceiveFailed(format!(
                    "Serial read error: {e}"
                )))
            },
            Err(_) => {
                debug!("Serial RX timeout waiting for {}B", len);
                Err(TransportError::Timeout(format!(
                    "Receive of {len} bytes timed out after {read_timeout:?}"
                )))
            },
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // Serial port is closed when the stream is dropped
        if self.port.take().is_some() {
            info!("Closed serial port: {}", self.config.port);
        }
        Ok(())
    }

    fn stats(&self) -> TransportStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_dongle_line_settings() {
        let config = SerialTransportConfig::default();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.stop_bits, 1);
        assert_eq!(config.parity, "None");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serial_config_validation() {
        let mut config = SerialTransportConfig::default();

        config.port = "".to_string();
        assert!(config.validate().is_err());

        config.port = "/dev/ttyUSB0".to_string();
        config.baud_rate = 0;
        assert!(config.validate().is_err());

        config.baud_rate = 115_200;
        config.data_bits = 9;
        assert!(config.validate().is_err());

        config.data_bits = 8;
        config.stop_bits = 3;
        assert!(config.validate().is_err());

        config.stop_bits = 1;
        config.parity = "Mark".to_string();
        assert!(config.validate().is_err());

        config.parity = "None".to_string();
        config.flow_control = "Invalid".to_string();
        assert!(config.validate().is_err());

        config.flow_control = "None".to_string();
        config.read_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serial_config_parsing() {
        let config = SerialTransportConfig {
            parity: "Even".to_string(),
            flow_control: "Hardware".to_string(),
            data_bits: 7,
            stop_bits: 2,
            ..Default::default()
        };

        assert_eq!(config.parse_parity(), tokio_serial::Parity::Even);
        assert_eq!(
            config.parse_flow_control(),
            tokio_serial::FlowControl::Hardware
        );
        assert_eq!(config.parse_data_bits(), tokio_serial::DataBits::Seven);
        assert_eq!(config.parse_stop_bits(), tokio_serial::StopBits::Two);
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let config = SerialTransportConfig::for_port("");
        let result = SerialTransport::open(config);
        assert!(matches!(result, Err(TransportError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_open_missing_device_fails() {
        let config = SerialTransportConfig::for_port("/dev/hacklet-does-not-exist");
        let result = SerialTransport::open(config);
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }
}
