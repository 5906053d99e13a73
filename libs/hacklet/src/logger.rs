//! Packet logging
//!
//! The session reports every transmitted and received record, plus boot
//! lifecycle steps, to an injected [`PacketLogger`]. The default logger
//! discards everything; protocol behavior never depends on which one is used.

use std::fmt;
use std::fmt::Write;

/// Direction of a logged byte record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Tx,
    Rx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Tx => write!(f, "TX"),
            Direction::Rx => write!(f, "RX"),
        }
    }
}

/// Render bytes as space separated two-character hex pairs
///
/// Example: `[0x02, 0x40, 0x04]` -> `"02 40 04"`
pub fn hex_pairs(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len() * 3);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            result.push(' ');
        }
        // Writing to String buffer is infallible
        let _ = write!(&mut result, "{:02X}", byte);
    }
    result
}

/// Sink for session lifecycle messages and raw packet records
pub trait PacketLogger: Send + Sync + fmt::Debug {
    /// Log a session lifecycle step ("Booting", "Locking network", ...)
    fn log_event(&self, message: &str);

    /// Log one byte record crossing the transport
    fn log_packet(&self, direction: Direction, data: &[u8]);
}

/// Logger that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPacketLogger;

impl PacketLogger for NoopPacketLogger {
    fn log_event(&self, _message: &str) {}

    fn log_packet(&self, _direction: Direction, _data: &[u8]) {}
}

/// Logger that forwards to `tracing`
///
/// Lifecycle events go out at INFO, packets at DEBUG.
#[derive(Debug, Clone)]
pub struct TracingPacketLogger {
    device: String,
}

impl TracingPacketLogger {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

impl PacketLogger for TracingPacketLogger {
    fn log_event(&self, message: &str) {
        tracing::info!(device = %self.device, "{}", message);
    }

    fn log_packet(&self, direction: Direction, data: &[u8]) {
        tracing::debug!(
            device = %self.device,
            direction = %direction,
            length = data.len(),
            "[{}] {} bytes: [{}]",
            direction,
            data.len(),
            hex_pairs(data)
        );
    }
}
