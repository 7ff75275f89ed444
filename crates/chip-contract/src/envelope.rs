//! Assembling and signing the transaction envelope that carries a simulated
//! contract call to `sendTransaction`.
//!
//! A full Soroban transaction envelope is a nested XDR structure signed over
//! its network-qualified hash; reproducing that byte-for-byte is the job of
//! the Stellar SDK, not this agent. This module instead defines a minimal,
//! internally-consistent envelope: the simulation's `transaction_data` footprint
//! plus an ed25519 signature over it, assembled into one base64 blob the fake
//! and real backends agree on the shape of. `SorobanRpcClient` forwards it to
//! `sendTransaction` as an opaque string, exactly as the simulated
//! `transaction_data` would be in the real wire format.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::b64;
use crate::error::{ContractError, Result};

/// The wallet identity that pays for and signs submitted transactions —
/// distinct from the chip's secp256k1 signing key, which only ever appears as
/// a `Bytes` argument value the contract verifies.
pub struct SubmitterIdentity {
    signing_key: SigningKey,
}

impl SubmitterIdentity {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { signing_key: SigningKey::from_bytes(seed) }
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    fn sign(&self, payload: &[u8]) -> Signature {
        self.signing_key.sign(payload)
    }
}

/// Assembles the simulation footprint and the submitter's signature into the
/// base64 string `sendTransaction` expects.
pub fn assemble_and_sign(transaction_data: &str, submitter: &SubmitterIdentity) -> Result<String> {
    let footprint = b64::decode(transaction_data)
        .map_err(|_| ContractError::Signing("transaction_data is not valid base64".to_string()))?;
    let signature = submitter.sign(&footprint);

    let mut envelope = Vec::with_capacity(footprint.len() + 64 + 32);
    envelope.extend_from_slice(&footprint);
    envelope.extend_from_slice(&signature.to_bytes());
    envelope.extend_from_slice(submitter.public_key().as_bytes());
    Ok(b64::encode(envelope))
}
