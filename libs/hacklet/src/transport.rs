//! Transport Layer Module
//!
//! Byte-stream transports the session drives. The session owns exactly one
//! transport for its whole lifetime and always closes it on scope exit.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │   Session (boot, guard,      │
//! │   select_network, samples)   │
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │  Transport trait             │
//! │  write(), read(n), close()   │
//! └──────────────────────────────┘
//!        │               │
//!        ▼               ▼
//!  ┌───────────┐   ┌───────────┐
//!  │  Serial   │   │   Mock    │
//!  └───────────┘   └───────────┘
//! ```

pub mod mock;
pub mod serial;
pub mod traits;

pub use mock::MockTransport;
pub use serial::{SerialTransport, SerialTransportConfig};
pub use traits::{Transport, TransportError, TransportStats};
