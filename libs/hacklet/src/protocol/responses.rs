//! Inbound response records
//!
//! Decoding checks the envelope (start byte, command code, payload length) and
//! pulls out the payload fields. Checksums are carried but never verified.

use bytes::Buf;
use serde::Serialize;

use super::constants::{
    ACK_RESPONSE, BOOT_CONFIRM_RESPONSE, BOOT_RESPONSE, BOOT_RESPONSE_LEN, ENVELOPE_HEADER_LEN,
    ENVELOPE_TRAILER_LEN, HANDSHAKE_RESPONSE, LOCK_RESPONSE, SAMPLES_FIXED_PAYLOAD_LEN,
    SAMPLES_RESPONSE, SAMPLE_WIDTH, START_BYTE, STATUS_RESPONSE_LEN,
};
use crate::error::{DongleError, Result};

/// A response record that can be decoded from raw bytes
pub trait Decode: Sized {
    /// Short name used in logs and errors
    const NAME: &'static str;

    fn decode(bytes: &[u8]) -> Result<Self>;
}

/// A response whose total length is a protocol constant
pub trait FixedLength: Decode {
    const LEN: usize;
}

/// Validate the record envelope and return `(payload, checksum)`
fn split_envelope<'a>(name: &str, bytes: &'a [u8], command: u16) -> Result<(&'a [u8], u8)> {
    if bytes.len() < ENVELOPE_HEADER_LEN + ENVELOPE_TRAILER_LEN {
        return Err(DongleError::decode(format!(
            "{name}: record too short ({} bytes)",
            bytes.len()
        )));
    }

    let mut header = &bytes[..ENVELOPE_HEADER_LEN];
    let start = header.get_u8();
    let code = header.get_u16();
    let payload_len = header.get_u8() as usize;

    if start != START_BYTE {
        return Err(DongleError::decode(format!(
            "{name}: invalid start byte 0x{start:02X}"
        )));
    }

    if code != command {
        return Err(DongleError::decode(format!(
            "{name}: expected command 0x{command:04X}, got 0x{code:04X}"
        )));
    }

    let expected = ENVELOPE_HEADER_LEN + payload_len + ENVELOPE_TRAILER_LEN;
    if bytes.len() != expected {
        return Err(DongleError::decode(format!(
            "{name}: payload length {payload_len} implies {expected} bytes, got {}",
            bytes.len()
        )));
    }

    let checksum = bytes[bytes.len() - 1];
    Ok((&bytes[ENVELOPE_HEADER_LEN..bytes.len() - 1], checksum))
}

fn require_len(name: &str, bytes: &[u8], len: usize) -> Result<()> {
    if bytes.len() != len {
        return Err(DongleError::decode(format!(
            "{name}: expected {len} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}

/// Reply to `BootRequest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootResponse {
    /// Dongle hardware identifier
    pub device_id: u64,
    /// Remaining boot payload, layout unknown
    pub info: Vec<u8>,
    pub checksum: u8,
}

impl Decode for BootResponse {
    const NAME: &'static str = "BootResponse";

    fn decode(bytes: &[u8]) -> Result<Self> {
        require_len(Self::NAME, bytes, Self::LEN)?;
        let (mut payload, checksum) = split_envelope(Self::NAME, bytes, BOOT_RESPONSE)?;

        if payload.len() < 8 {
            return Err(DongleError::decode(format!(
                "{}: payload too short for device id",
                Self::NAME
            )));
        }

        let device_id = payload.get_u64();
        Ok(Self {
            device_id,
            info: payload.to_vec(),
            checksum,
        })
    }
}

impl FixedLength for BootResponse {
    const LEN: usize = BOOT_RESPONSE_LEN;
}

/// Six byte replies carrying a single status byte
macro_rules! status_response {
    ($(#[$meta:meta])* $name:ident, $command:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub status: u8,
            pub checksum: u8,
        }

        impl Decode for $name {
            const NAME: &'static str = stringify!($name);

            fn decode(bytes: &[u8]) -> Result<Self> {
                require_len(Self::NAME, bytes, Self::LEN)?;
                let (mut payload, checksum) = split_envelope(Self::NAME, bytes, $command)?;
                if payload.remaining() != 1 {
                    return Err(DongleError::decode(format!(
                        "{}: expected 1 status byte, got {}",
                        Self::NAME,
                        payload.remaining()
                    )));
                }
                Ok(Self {
                    status: payload.get_u8(),
                    checksum,
                })
            }
        }

        impl FixedLength for $name {
            const LEN: usize = STATUS_RESPONSE_LEN;
        }
    };
}

status_response!(
    /// Reply to `BootConfirmRequest`
    BootConfirmResponse,
    BOOT_CONFIRM_RESPONSE
);
status_response!(
    /// Reply to `LockRequest`
    LockResponse,
    LOCK_RESPONSE
);
status_response!(
    /// Reply to `HandshakeRequest`
    HandshakeResponse,
    HANDSHAKE_RESPONSE
);
status_response!(
    /// Acknowledgement sent ahead of the sample data
    AckResponse,
    ACK_RESPONSE
);

/// Stored samples for one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SamplesResponse {
    pub network_id: u16,
    pub channel_id: u16,
    pub flags: u8,
    /// Device timestamp of the newest sample, seconds since the Unix epoch
    pub time: u32,
    /// Samples still held on the device after this batch
    pub stored_sample_count: u32,
    pub samples: Vec<u16>,
    pub checksum: u8,
}

impl Decode for SamplesResponse {
    const NAME: &'static str = "SamplesResponse";

    fn decode(bytes: &[u8]) -> Result<Self> {
        let (mut payload, checksum) = split_envelope(Self::NAME, bytes, SAMPLES_RESPONSE)?;

        if payload.len() < SAMPLES_FIXED_PAYLOAD_LEN {
            return Err(DongleError::decode(format!(
                "{}: payload of {} bytes is shorter than the {} byte sample header",
                Self::NAME,
                payload.len(),
                SAMPLES_FIXED_PAYLOAD_LEN
            )));
        }

        // Sample count comes from the declared length, not the count byte
        let sample_bytes = payload.len() - SAMPLES_FIXED_PAYLOAD_LEN;
        if sample_bytes % SAMPLE_WIDTH != 0 {
            return Err(DongleError::decode(format!(
                "{}: {} trailing bytes do not form whole samples",
                Self::NAME,
                sample_bytes
            )));
        }

        let network_id = payload.get_u16();
        let channel_id = payload.get_u16();
        let flags = payload.get_u8();
        let time = payload.get_u32_le();
        let _reported_count = payload.get_u8();
        let stored_sample_count = payload.get_uint(3) as u32;

        let mut samples = Vec::with_capacity(sample_bytes / SAMPLE_WIDTH);
        while payload.remaining() >= SAMPLE_WIDTH {
            samples.push(payload.get_u16_le());
        }

        Ok(Self {
            network_id,
            channel_id,
            flags,
            time,
            stored_sample_count,
            samples,
            checksum,
        })
    }
}
