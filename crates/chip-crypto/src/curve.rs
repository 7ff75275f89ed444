//! C2 — secp256k1 curve utilities: low-S normalization and public-key
//! recovery from `(msg_hash, r, s, rid)`.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};

/// secp256k1 group order `n`, big-endian.
pub const N: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// `n / 2`, big-endian.
pub const HALF_N: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Uncompressed secp256k1 public key: `0x04 || X(32) || Y(32)`.
pub type PubKey65 = [u8; 65];

fn be_cmp(a: &[u8; 32], b: &[u8; 32]) -> std::cmp::Ordering {
    a.iter().cmp(b.iter())
}

/// Subtracts `b` from `a` as 32-byte big-endian integers, `a >= b` required.
fn be_sub(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let diff = a[i] as i16 - b[i] as i16 - borrow;
        if diff < 0 {
            out[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            out[i] = diff as u8;
            borrow = 0;
        }
    }
    out
}

/// Normalizes `s` to the low-S form required by the on-chain verifier:
/// if `s > n/2`, returns `n - s`; otherwise returns `s` unchanged.
///
/// Idempotent: `normalize_s(normalize_s(s)) == normalize_s(s)`.
pub fn normalize_s(s: &[u8; 32]) -> [u8; 32] {
    if be_cmp(s, &HALF_N) == std::cmp::Ordering::Greater {
        be_sub(&N, s)
    } else {
        *s
    }
}

/// Recovers the secp256k1 public key that produced `(r, s)` over `msg_hash`,
/// given a recovery id in `0..=3`.
///
/// Returns `None` for any degenerate input: `r`/`s` out of range, an
/// unrecoverable point, or a recovery id outside `0..=3`.
pub fn recover(msg_hash: &[u8; 32], r: &[u8; 32], s: &[u8; 32], rid: u8) -> Option<PubKey65> {
    let signature = EcdsaSignature::from_scalars(*r, *s).ok()?;
    let recovery_id = RecoveryId::from_byte(rid)?;
    let verifying_key =
        VerifyingKey::recover_from_prehash(msg_hash, &signature, recovery_id).ok()?;
    let encoded = verifying_key.to_encoded_point(false);
    let bytes = encoded.as_bytes();
    if bytes.len() != 65 {
        return None;
    }
    let mut out = [0u8; 65];
    out.copy_from_slice(bytes);
    Some(out)
}
