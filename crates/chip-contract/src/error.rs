use thiserror::Error;

/// Narrow error type for the Soroban RPC / contract-invocation layer.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("RPC transport error: {0}")]
    Rpc(#[from] reqwest::Error),

    #[error("RPC returned an error: {0}")]
    RpcError(String),

    #[error("contract simulation failed: {0}")]
    Simulation(String),

    #[error("contract execution failed: {message} (code: {code:?})")]
    Execution { message: String, code: Option<i32> },

    #[error("could not decode contract return value: {0}")]
    Decode(&'static str),

    #[error("signing the transaction envelope failed: {0}")]
    Signing(String),

    #[error("polling for a terminal status timed out after {0} attempts")]
    PollTimeout(u32),

    #[error("the contract rejected a non-increasing replay nonce")]
    ReplayNonce,
}

pub type Result<T> = std::result::Result<T, ContractError>;
