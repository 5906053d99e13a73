//! Dongle Error Types
//!
//! Errors surfaced by the session driver. Transport-level failures are folded
//! into `TransportFailure` at the session boundary.

use thiserror::Error;

use crate::transport::TransportError;

/// Result type for hacklet operations
pub type Result<T> = std::result::Result<T, DongleError>;

/// Dongle driver errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DongleError {
    /// An operation was invoked outside an open session
    #[error("Must be executed within an open session")]
    SessionNotOpen,

    /// The byte stream failed to write or to deliver the requested byte count
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Received bytes do not match the expected response layout
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<TransportError> for DongleError {
    fn from(err: TransportError) -> Self {
        DongleError::TransportFailure(err.to_string())
    }
}

impl From<std::io::Error> for DongleError {
    fn from(err: std::io::Error) -> Self {
        DongleError::TransportFailure(err.to_string())
    }
}

impl From<figment::Error> for DongleError {
    fn from(err: figment::Error) -> Self {
        DongleError::Config(err.to_string())
    }
}

// Helper methods for creating errors
impl DongleError {
    pub fn transport(msg: impl Into<String>) -> Self {
        DongleError::TransportFailure(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        DongleError::DecodeFailure(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        DongleError::Config(msg.into())
    }

    /// Whether the failure came from decoding a reply
    pub fn is_decode(&self) -> bool {
        matches!(self, DongleError::DecodeFailure(_))
    }

    /// Whether the failure came from the underlying byte stream
    pub fn is_transport(&self) -> bool {
        matches!(self, DongleError::TransportFailure(_))
    }
}
