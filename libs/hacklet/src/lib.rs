//! Hacklet Dongle Driver
//!
//! Command/response driver for the Modlet USB dongle. A session boots the
//! dongle (boot, boot confirm, lock) and then lets the caller select a network
//! and pull stored samples from a channel.
//!
//! # Architecture
//!
//! ```text
//! hacklet
//!     ├── Dongle / Session (boot sequence, session guard, operations)
//!     ├── protocol (command encoding, response decoding, samples framing)
//!     ├── transport (Transport trait, serial and mock transports)
//!     ├── logger (PacketLogger: no-op default, tracing backed)
//!     └── config (figment: defaults, YAML file, HACKLET_ env vars)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hacklet::{Dongle, SerialTransportConfig};
//!
//! # async fn run() -> hacklet::Result<()> {
//! let dongle = Dongle::new();
//! let samples = dongle
//!     .open_session(SerialTransportConfig::default(), |session| {
//!         Box::pin(async move {
//!             session.select_network(0x1234).await?;
//!             session.request_samples(0x1234, 0x0000).await
//!         })
//!     })
//!     .await?;
//! println!("{} samples", samples.samples.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-export core types
pub use config::{DongleConfig, LoggingConfig};
pub use error::{DongleError, Result};
pub use logger::{Direction, NoopPacketLogger, PacketLogger, TracingPacketLogger};
pub use protocol::{
    AckResponse, BootConfirmResponse, BootResponse, Command, HandshakeResponse, LockResponse,
    SamplesResponse,
};
pub use session::{BootReport, Dongle, Session, SessionState};
pub use transport::{
    MockTransport, SerialTransport, SerialTransportConfig, Transport, TransportError,
    TransportStats,
};
