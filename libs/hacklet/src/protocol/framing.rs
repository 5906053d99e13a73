//! Variable-length framing for the samples reply
//!
//! The samples reply does not have a fixed size. The driver reads a 4 byte
//! header chunk, renders it as hex-pair text (`"02 40 A4 0F"`), and takes the
//! fourth token as the hexadecimal payload length. The checksum byte follows
//! the payload.
//!
//! ```text
//!  header chunk        tokens               remaining
//!  02 40 A4 0F   ->   ["02","40","A4","0F"] ->  0x0F + 1 = 16
//! ```
//!
//! Token splitting is kept separate from the byte rendering so it can be
//! checked directly against captured header text.

use crate::error::{DongleError, Result};
use crate::logger::hex_pairs;

/// Bytes read before the frame length is known
pub const HEADER_CHUNK_LEN: usize = 4;

/// Token holding the declared length
const LENGTH_TOKEN_INDEX: usize = 3;

/// Bytes that follow the declared length (the trailing checksum)
const LENGTH_ADJUSTMENT: usize = 1;

/// Parse the declared length out of header text
pub fn declared_length(header_text: &str) -> Result<usize> {
    let tokens: Vec<&str> = header_text.split_whitespace().collect();

    let token = tokens.get(LENGTH_TOKEN_INDEX).ok_or_else(|| {
        DongleError::decode(format!(
            "sample header has {} tokens, need at least {}",
            tokens.len(),
            LENGTH_TOKEN_INDEX + 1
        ))
    })?;

    if !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DongleError::decode(format!(
            "sample header length token {token:?} is not hexadecimal"
        )));
    }

    usize::from_str_radix(token, 16).map_err(|e| {
        DongleError::decode(format!(
            "sample header length token {token:?} is not hexadecimal: {e}"
        ))
    })
}

/// Number of bytes still to read after the header chunk
pub fn remaining_length(header: &[u8]) -> Result<usize> {
    let declared = declared_length(&hex_pairs(header))?;
    Ok(declared + LENGTH_ADJUSTMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_length_from_text() {
        assert_eq!(declared_length("00 00 00 0A").unwrap(), 10);
        assert_eq!(declared_length("02 40 a4 ff").unwrap(), 255);
    }

    #[test]
    fn test_declared_length_ignores_extra_tokens() {
        assert_eq!(declared_length("02 40 A4 0F 00 01").unwrap(), 15);
    }

    #[test]
    fn test_declared_length_too_few_tokens() {
        let err = declared_length("00 00 0A").unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("3 tokens"));

        assert!(declared_length("").unwrap_err().is_decode());
    }

    #[test]
    fn test_declared_length_non_hex_token() {
        let err = declared_length("00 00 00 0G").unwrap_err();
        assert!(err.is_decode());

        // A sign prefix is not part of the hex rendering
        assert!(declared_length("00 00 00 +A").is_err());
    }

    #[test]
    fn test_remaining_length_adds_checksum_byte() {
        assert_eq!(remaining_length(&[0x00, 0x00, 0x00, 0x0A]).unwrap(), 11);
        assert_eq!(remaining_length(&[0x02, 0x40, 0xA4, 0x0F]).unwrap(), 16);
        assert_eq!(remaining_length(&[0x02, 0x40, 0xA4, 0x00]).unwrap(), 1);
    }

    #[test]
    fn test_remaining_length_short_header() {
        let err = remaining_length(&[0x02, 0x40, 0xA4]).unwrap_err();
        assert!(err.is_decode());
    }
}
