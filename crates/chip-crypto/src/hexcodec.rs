//! C1 — hex/byte codec: hex <-> bytes, big-endian integer I/O, constant-time
//! comparison on fixed-size field elements.

use crate::error::{CryptoError, Result};

/// Decodes a hex string into bytes.
///
/// Accepts an optional `0x`/`0X` prefix. An odd number of hex digits after
/// stripping the prefix is a hard error (we do not silently left-pad), and any
/// non-hex-digit character is a hard error.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if stripped.len() % 2 != 0 {
        return Err(CryptoError::InvalidHex(format!(
            "odd-length hex string ({} digits)",
            stripped.len()
        )));
    }
    hex::decode(stripped).map_err(|e| CryptoError::InvalidHex(e.to_string()))
}

/// Encodes bytes as a bare (no `0x` prefix) lowercase hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Constant-time equality check on equal-length byte slices.
///
/// Returns `false` immediately if the lengths differ (length is not treated
/// as secret here; only the content of 32-byte field elements is).
pub fn const_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Encodes `x` as a 4-byte big-endian array.
pub fn be_u32_to_bytes(x: u32) -> [u8; 4] {
    x.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_0x_prefix() {
        assert_eq!(decode_hex("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(decode_hex("dead").unwrap(), vec![0xde, 0xad]);
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert!(decode_hex("0xabc").is_err());
    }

    #[test]
    fn decode_rejects_non_hex() {
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn const_eq_detects_mismatch_and_length() {
        assert!(const_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!const_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!const_eq(&[1, 2, 3], &[1, 2]));
    }

    #[test]
    fn be_u32_round_trip() {
        assert_eq!(be_u32_to_bytes(1), [0, 0, 0, 1]);
        assert_eq!(u32::from_be_bytes(be_u32_to_bytes(0x01020304)), 0x01020304);
    }
}
