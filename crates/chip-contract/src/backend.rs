//! The seam between the invocation pipeline (`invoker`, `nonce`) and whatever
//! actually reaches the network. Production code drives `SorobanRpcBackend`;
//! tests drive `FakeContractBackend` (see the `fake` module).

use async_trait::async_trait;

use crate::abi::ScVal;
use crate::error::Result;

/// A simulated call: resource footprint plus, for a successful simulation,
/// the decoded return value.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub transaction_data: String,
    pub min_resource_fee: u64,
    pub result: ScVal,
}

/// Terminal and non-terminal states `getTransaction` can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SubmittedTransaction {
    pub hash: String,
}

#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    pub status: TransactionStatus,
    pub result: Option<ScVal>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

/// Everything the invocation pipeline needs from a Soroban RPC endpoint,
/// abstracted so tests never touch the network.
#[async_trait]
pub trait ContractBackend: Send + Sync {
    async fn simulate(&self, contract_id: &str, method: &str, args: &[ScVal]) -> Result<Simulation>;

    async fn submit_signed(&self, signed_envelope_xdr: &str) -> Result<SubmittedTransaction>;

    async fn get_transaction(&self, hash: &str) -> Result<TransactionOutcome>;
}
