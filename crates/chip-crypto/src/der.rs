//! C3 — DER parser for ECDSA signatures: `SEQUENCE { INTEGER r, INTEGER s }`.

use crate::error::{CryptoError, Result};

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;

/// Parses a DER-encoded ECDSA signature into `(r, s)`, each left-padded to
/// exactly 32 bytes with any DER sign-byte padding stripped.
///
/// Rejects: wrong outer/inner tags, truncated or overrun lengths, and an `r`
/// or `s` whose unpadded magnitude exceeds 32 bytes.
pub fn parse(der: &[u8]) -> Result<([u8; 32], [u8; 32])> {
    let mut cursor = Cursor::new(der);

    let tag = cursor.take_u8()?;
    if tag != SEQUENCE_TAG {
        return Err(CryptoError::MalformedDer("expected SEQUENCE tag 0x30"));
    }
    let seq_len = cursor.take_len()?;
    let seq_start = cursor.pos;
    if seq_start + seq_len > der.len() {
        return Err(CryptoError::MalformedDer("SEQUENCE length overruns input"));
    }

    let r = parse_integer(&mut cursor)?;
    let s = parse_integer(&mut cursor)?;

    if cursor.pos != seq_start + seq_len {
        return Err(CryptoError::MalformedDer("trailing bytes inside SEQUENCE"));
    }

    Ok((r, s))
}

fn parse_integer(cursor: &mut Cursor) -> Result<[u8; 32]> {
    let tag = cursor.take_u8()?;
    if tag != INTEGER_TAG {
        return Err(CryptoError::MalformedDer("expected INTEGER tag 0x02"));
    }
    let len = cursor.take_len()?;
    let raw = cursor.take_bytes(len)?;

    // Strip a single leading 0x00 sign-disambiguation byte, if present.
    let trimmed = if raw.len() > 1 && raw[0] == 0x00 {
        &raw[1..]
    } else {
        raw
    };

    if trimmed.len() > 32 {
        return Err(CryptoError::MalformedDer("INTEGER exceeds 32 bytes after stripping"));
    }

    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take_u8(&mut self) -> Result<u8> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or(CryptoError::MalformedDer("unexpected end of input"))?;
        self.pos += 1;
        Ok(b)
    }

    fn take_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(CryptoError::MalformedDer("length overflow"))?;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(CryptoError::MalformedDer("length overruns input"))?;
        self.pos = end;
        Ok(slice)
    }

    /// Parses a DER length: short form (single byte, high bit clear) or long
    /// form (high bit set, low 7 bits give the number of following
    /// big-endian length bytes; capped at 4 per the spec).
    fn take_len(&mut self) -> Result<usize> {
        let first = self.take_u8()?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let n_bytes = (first & 0x7F) as usize;
        if n_bytes == 0 || n_bytes > 4 {
            return Err(CryptoError::MalformedDer("unsupported long-form length"));
        }
        let bytes = self.take_bytes(n_bytes)?;
        let mut len: usize = 0;
        for b in bytes {
            len = (len << 8) | (*b as usize);
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_zero_padded_integers() {
        // S2 from the spec: 30 46 02 21 00 <32 0xFE bytes> 02 21 00 <32 0x7F bytes>
        let mut der = vec![0x30, 0x46, 0x02, 0x21, 0x00];
        der.extend(std::iter::repeat(0xFEu8).take(32));
        der.push(0x02);
        der.push(0x21);
        der.push(0x00);
        der.extend(std::iter::repeat(0x7Fu8).take(32));

        let (r, s) = parse(&der).unwrap();
        assert_eq!(r, [0xFEu8; 32]);
        assert_eq!(s, [0x7Fu8; 32]);
    }

    #[test]
    fn round_trips_unpadded_integers() {
        let mut r_body = vec![0x01u8; 32];
        r_body[0] = 0x7F; // high bit clear, no padding needed
        let mut s_body = vec![0x02u8; 32];
        s_body[0] = 0x01;

        let mut der = vec![0x30, (2 + r_body.len() + 2 + s_body.len()) as u8];
        der.push(0x02);
        der.push(r_body.len() as u8);
        der.extend_from_slice(&r_body);
        der.push(0x02);
        der.push(s_body.len() as u8);
        der.extend_from_slice(&s_body);

        let (r, s) = parse(&der).unwrap();
        assert_eq!(&r[..], &r_body[..]);
        assert_eq!(&s[..], &s_body[..]);
    }

    #[test]
    fn rejects_wrong_outer_tag() {
        let der = [0x31, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01];
        assert!(parse(&der).is_err());
    }

    #[test]
    fn rejects_oversized_integer() {
        let mut der = vec![0x30, 0x00];
        der.push(0x02);
        der.push(33);
        der.extend(std::iter::repeat(0x01u8).take(33));
        der.push(0x02);
        der.push(0x01);
        der.push(0x01);
        der[1] = (der.len() - 2) as u8;
        assert!(parse(&der).is_err());
    }

    #[test]
    fn rejects_truncated_length() {
        let der = [0x30, 0x10, 0x02, 0x21];
        assert!(parse(&der).is_err());
    }
}
