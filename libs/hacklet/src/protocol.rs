//! Dongle Packet Codec
//!
//! ```text
//! protocol
//!     ├── Command (outbound records, encode)
//!     ├── responses (inbound records, decode)
//!     ├── framing (variable-length samples reply)
//!     └── constants (command codes, record sizes)
//! ```

mod commands;
mod constants;
pub mod framing;
mod responses;

pub use commands::Command;
pub use constants::{BOOT_RESPONSE_LEN, ENVELOPE_HEADER_LEN, STATUS_RESPONSE_LEN};
pub use framing::{declared_length, remaining_length, HEADER_CHUNK_LEN};
pub use responses::{
    AckResponse, BootConfirmResponse, BootResponse, Decode, FixedLength, HandshakeResponse,
    LockResponse, SamplesResponse,
};

/// XOR of every byte after the start byte
pub fn checksum(record: &[u8]) -> u8 {
    record.iter().skip(1).fold(0, |acc, byte| acc ^ byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_skips_start_byte() {
        assert_eq!(checksum(&[0x02, 0x40, 0x04, 0x00]), 0x44);
        assert_eq!(checksum(&[0xFF]), 0x00);
        assert_eq!(checksum(&[]), 0x00);
    }
}
