//! Transport Layer Traits
//!
//! This module defines the byte-stream interface the session drives. A transport
//! only moves bytes; framing and record layout live in the protocol module.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Transport layer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Opening the underlying device failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Send operation failed
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Receive operation failed
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Timeout occurred
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The transport was already closed
    #[error("Transport not connected")]
    NotConnected,
}

/// Transport statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Total bytes received
    pub bytes_received: u64,
    /// Number of write calls that completed
    pub frames_sent: u64,
    /// Number of read calls that completed
    pub reads_completed: u64,
}

impl TransportStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed write
    pub fn record_sent(&mut self, bytes: usize) {
        self.frames_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    /// Record a completed read
    pub fn record_received(&mut self, bytes: usize) {
        self.reads_completed += 1;
        self.bytes_received += bytes as u64;
    }
}

/// Byte-stream transport owned by a single session
#[async_trait]
pub trait Transport: Send + fmt::Debug {
    /// Device or transport name used in session logs
    fn name(&self) -> &str;

    /// Write all of `data` to the device
    async fn write(&mut self, data: &[u8]) -> std::result::Result<(), TransportError>;

    /// Read exactly `len` bytes, blocking until they arrive or the transport fails
    ///
    /// Fewer than `len` bytes is an error, never a short `Ok`.
    async fn read(&mut self, len: usize) -> std::result::Result<Vec<u8>, TransportError>;

    /// Release the underlying device
    ///
    /// Calling `close` on an already closed transport is a no-op.
    async fn close(&mut self) -> std::result::Result<(), TransportError>;

    /// Get transport statistics
    fn stats(&self) -> TransportStats;
}
