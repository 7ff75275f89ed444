//! C12: one error type for the whole pipeline. Every lower-layer error
//! converts into exactly one kind here, so a caller only ever handles this
//! enum, never `CryptoError`/`TransportError`/`ContractError` directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChipAgentError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("chip protocol error: {0}")]
    ChipProtocol(String),

    #[error("DER decoding error: {0}")]
    Der(String),

    #[error("curve error: {0}")]
    Curve(String),

    #[error("SEP-53 message error: {0}")]
    Sep53(String),

    #[error("contract simulation error: {0}")]
    ContractSimulation(String),

    #[error("contract execution error: {message} (code: {code:?})")]
    ContractExecution { message: String, code: Option<i32> },

    #[error("replay nonce rejected by the contract")]
    ReplayNonce,

    #[error("no recovery id produced the expected public key")]
    RecoveryIdUnmatched,

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("operation cancelled by the user")]
    UserCancelled,

    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ChipAgentError>;

impl From<chip_crypto::CryptoError> for ChipAgentError {
    fn from(err: chip_crypto::CryptoError) -> Self {
        use chip_crypto::CryptoError::*;
        match err {
            MalformedDer(_) => Self::Der(err.to_string()),
            RecoveryIdUnmatched => Self::RecoveryIdUnmatched,
            InvalidHex(_) | OutOfRange | Sep53Encoding(_) | BadNetworkHash | BadContractId => {
                Self::Sep53(err.to_string())
            }
        }
    }
}

impl From<chip_transport::TransportError> for ChipAgentError {
    fn from(err: chip_transport::TransportError) -> Self {
        use chip_transport::TransportError::*;
        match err {
            Timeout(_) => Self::Timeout(err.to_string()),
            UserCancelled => Self::UserCancelled,
            BadStatus { .. } | MalformedResponse(_) | Invariant(_) | MultipleTags => {
                Self::ChipProtocol(err.to_string())
            }
            Io(_) | NotConnected | SessionAlreadyActive => Self::Transport(err.to_string()),
        }
    }
}

impl From<chip_contract::ContractError> for ChipAgentError {
    fn from(err: chip_contract::ContractError) -> Self {
        use chip_contract::ContractError::*;
        match err {
            Simulation(msg) => Self::ContractSimulation(msg),
            Execution { message, code } => Self::ContractExecution { message, code },
            ReplayNonce => Self::ReplayNonce,
            PollTimeout(attempts) => Self::Timeout(format!("polling timed out after {attempts} attempts")),
            Rpc(_) | RpcError(_) | Decode(_) | Signing(_) => Self::Transport(err.to_string()),
        }
    }
}
