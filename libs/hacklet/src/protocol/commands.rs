//! Outbound command records

use bytes::{BufMut, BytesMut};

use super::checksum;
use super::constants::{
    BOOT_CONFIRM_REQUEST, BOOT_REQUEST, ENVELOPE_HEADER_LEN, ENVELOPE_TRAILER_LEN,
    HANDSHAKE_REQUEST, HANDSHAKE_TRAILER, LOCK_PAYLOAD, LOCK_REQUEST, SAMPLES_REQUEST,
    SAMPLES_TRAILER, START_BYTE,
};

/// Command sent to the dongle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Wake the dongle up
    BootRequest,
    /// Acknowledge the boot response
    BootConfirmRequest,
    /// Lock the radio network
    LockRequest,
    /// Select a network
    HandshakeRequest { network_id: u16 },
    /// Ask a channel for its stored samples
    SamplesRequest { network_id: u16, channel_id: u16 },
}

impl Command {
    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Command::BootRequest => "BootRequest",
            Command::BootConfirmRequest => "BootConfirmRequest",
            Command::LockRequest => "LockRequest",
            Command::HandshakeRequest { .. } => "HandshakeRequest",
            Command::SamplesRequest { .. } => "SamplesRequest",
        }
    }

    pub fn command_code(&self) -> u16 {
        match self {
            Command::BootRequest => BOOT_REQUEST,
            Command::BootConfirmRequest => BOOT_CONFIRM_REQUEST,
            Command::LockRequest => LOCK_REQUEST,
            Command::HandshakeRequest { .. } => HANDSHAKE_REQUEST,
            Command::SamplesRequest { .. } => SAMPLES_REQUEST,
        }
    }

    /// Payload length; fixed per variant
    pub fn payload_len(&self) -> usize {
        match self {
            Command::BootRequest | Command::BootConfirmRequest => 0,
            Command::LockRequest => LOCK_PAYLOAD.len(),
            Command::HandshakeRequest { .. } => 4,
            Command::SamplesRequest { .. } => 6,
        }
    }

    /// Total record length on the wire
    pub fn encoded_len(&self) -> usize {
        ENVELOPE_HEADER_LEN + self.payload_len() + ENVELOPE_TRAILER_LEN
    }

    fn put_payload(&self, buf: &mut BytesMut) {
        match *self {
            Command::BootRequest | Command::BootConfirmRequest => {},
            Command::LockRequest => buf.put_slice(&LOCK_PAYLOAD),
            Command::HandshakeRequest { network_id } => {
                buf.put_u16(network_id);
                buf.put_u16(HANDSHAKE_TRAILER);
            },
            Command::SamplesRequest {
                network_id,
                channel_id,
            } => {
                buf.put_u16(network_id);
                buf.put_u16(channel_id);
                buf.put_u16(SAMPLES_TRAILER);
            },
        }
    }

    /// Serialize to the wire record
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(START_BYTE);
        buf.put_u16(self.command_code());
        buf.put_u8(self.payload_len() as u8);
        self.put_payload(&mut buf);
        let sum = checksum(&buf);
        buf.put_u8(sum);
        buf.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_request_encoding() {
        assert_eq!(Command::BootRequest.encode(), vec![0x02, 0x40, 0x04, 0x00, 0x44]);
    }

    #[test]
    fn test_boot_confirm_request_encoding() {
        assert_eq!(
            Command::BootConfirmRequest.encode(),
            vec![0x02, 0x40, 0x00, 0x00, 0x40]
        );
    }

    #[test]
    fn test_lock_request_encoding() {
        assert_eq!(
            Command::LockRequest.encode(),
            vec![0x02, 0xA2, 0x36, 0x04, 0xFC, 0xFF, 0x90, 0x01, 0x02]
        );
    }

    #[test]
    fn test_handshake_request_encoding() {
        let frame = Command::HandshakeRequest { network_id: 0x1234 }.encode();
        assert_eq!(
            frame,
            vec![0x02, 0x40, 0x03, 0x04, 0x12, 0x34, 0x05, 0x00, 0x64]
        );
    }

    #[test]
    fn test_samples_request_encoding() {
        let frame = Command::SamplesRequest {
            network_id: 0x0001,
            channel_id: 0x0002,
        }
        .encode();
        assert_eq!(
            frame,
            vec![0x02, 0x40, 0x24, 0x06, 0x00, 0x01, 0x00, 0x02, 0x0A, 0x00, 0x6B]
        );
    }

    #[test]
    fn test_encoded_len_is_fixed_per_variant() {
        let commands = [
            Command::BootRequest,
            Command::BootConfirmRequest,
            Command::LockRequest,
            Command::HandshakeRequest { network_id: 0xFFFF },
            Command::SamplesRequest {
                network_id: 0xBEEF,
                channel_id: 0x0000,
            },
        ];
        for command in commands {
            assert_eq!(command.encode().len(), command.encoded_len(), "{}", command.name());
        }
    }
}
