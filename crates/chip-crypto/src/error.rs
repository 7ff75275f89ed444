use thiserror::Error;

/// Narrow error type for the pure cryptographic primitives in this crate.
///
/// Nothing here ever formats a user-facing message; `chip-agent` owns that and
/// converts these into the unified taxonomy via `From`.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid hex input: {0}")]
    InvalidHex(String),

    #[error("malformed DER signature: {0}")]
    MalformedDer(&'static str),

    #[error("field element out of range")]
    OutOfRange,

    #[error("SEP-53 argument encoding failed: {0}")]
    Sep53Encoding(#[from] serde_json::Error),

    #[error("network passphrase hash must be exactly 32 bytes")]
    BadNetworkHash,

    #[error("contract id must be exactly 32 bytes")]
    BadContractId,

    #[error("no recovery id in 0..=3 recovers the expected public key")]
    RecoveryIdUnmatched,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
