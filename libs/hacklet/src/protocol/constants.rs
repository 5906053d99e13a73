//! Protocol constants
//!
//! Every record on the wire is `[START][COMMAND:2][LEN][PAYLOAD:LEN][CHECKSUM]`,
//! with multi-byte envelope fields in big-endian order.

/// First byte of every record
pub const START_BYTE: u8 = 0x02;

/// Start byte, command code and payload length
pub const ENVELOPE_HEADER_LEN: usize = 4;

/// Trailing checksum byte
pub const ENVELOPE_TRAILER_LEN: usize = 1;

// Outbound command codes
pub const BOOT_REQUEST: u16 = 0x4004;
pub const BOOT_CONFIRM_REQUEST: u16 = 0x4000;
pub const LOCK_REQUEST: u16 = 0xA236;
pub const HANDSHAKE_REQUEST: u16 = 0x4003;
pub const SAMPLES_REQUEST: u16 = 0x4024;

// Inbound command codes
pub const BOOT_RESPONSE: u16 = 0x4084;
pub const BOOT_CONFIRM_RESPONSE: u16 = 0x4080;
pub const LOCK_RESPONSE: u16 = 0xA0F9;
pub const HANDSHAKE_RESPONSE: u16 = 0x4083;
pub const ACK_RESPONSE: u16 = 0x4024;
pub const SAMPLES_RESPONSE: u16 = 0x40A4;

/// Lock request payload, sent verbatim
pub const LOCK_PAYLOAD: [u8; 4] = [0xFC, 0xFF, 0x90, 0x01];

/// Trailing word of a handshake request
pub const HANDSHAKE_TRAILER: u16 = 0x0500;

/// Trailing word of a samples request
pub const SAMPLES_TRAILER: u16 = 0x0A00;

/// Total length of a boot response
pub const BOOT_RESPONSE_LEN: usize = 27;

/// Total length of every single-status response
pub const STATUS_RESPONSE_LEN: usize = 6;

/// Fixed samples payload ahead of the sample array:
/// network(2) channel(2) flags(1) time(4) count(1) stored(3)
pub const SAMPLES_FIXED_PAYLOAD_LEN: usize = 13;

/// Each stored sample is a little-endian u16
pub const SAMPLE_WIDTH: usize = 2;
