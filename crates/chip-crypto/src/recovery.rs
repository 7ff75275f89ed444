//! C8 — recovery-id resolver: the single authoritative place that turns
//! `(msg_hash, r, s)` plus a known chip public key into a recovery id.
//!
//! The source this system is modeled on hard-codes `recovery_id = 1` in one
//! place and trial-searches `0..=3` in another; this module exists so every
//! pipeline goes through the same search and the same equality check.

use crate::curve::{recover, PubKey65};
use crate::error::{CryptoError, Result};
use crate::hexcodec::const_eq;

/// Tries every recovery id in `0..=3`, returning the first one whose
/// recovered public key matches `expected_pubkey` in constant time.
///
/// Implementations may short-circuit on the first match (this one does);
/// the result must never be cached across chip sessions, since a different
/// chip could be presented mid-flow.
pub fn determine_rid(
    msg_hash: &[u8; 32],
    r: &[u8; 32],
    s_low: &[u8; 32],
    expected_pubkey: &PubKey65,
) -> Result<u8> {
    for rid in 0..=3u8 {
        if let Some(candidate) = recover(msg_hash, r, s_low, rid) {
            if const_eq(&candidate, expected_pubkey) {
                return Ok(rid);
            }
        }
    }
    Err(CryptoError::RecoveryIdUnmatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{signature::hazmat::PrehashSigner, RecoveryId, Signature, SigningKey};

    #[test]
    fn finds_the_matching_recovery_id_and_rejects_a_foreign_key() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32].into()).unwrap();
        let verifying_key = *signing_key.verifying_key();
        let msg_hash = [9u8; 32];

        let (signature, recovery_id): (Signature, RecoveryId) =
            signing_key.sign_prehash_recoverable(&msg_hash).unwrap();
        let (r, s) = signature.split_scalars();
        let r_bytes: [u8; 32] = r.to_bytes().into();
        let s_bytes: [u8; 32] = s.to_bytes().into();

        let encoded = verifying_key.to_encoded_point(false);
        let mut expected = [0u8; 65];
        expected.copy_from_slice(encoded.as_bytes());

        let found = determine_rid(&msg_hash, &r_bytes, &s_bytes, &expected).unwrap();
        assert_eq!(found, recovery_id.to_byte());

        let mut other_key = [0u8; 65];
        other_key.copy_from_slice(&expected);
        other_key[1] ^= 0xFF;
        assert!(determine_rid(&msg_hash, &r_bytes, &s_bytes, &other_key).is_err());
    }
}
