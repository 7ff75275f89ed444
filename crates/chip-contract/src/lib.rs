pub mod abi;
mod b64;
pub mod backend;
pub mod envelope;
pub mod error;
pub mod invoker;
pub mod nonce;
pub mod rpc;
mod xdr;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use abi::{Address, ContractCall, ScVal};
pub use backend::{ContractBackend, Simulation, SubmittedTransaction, TransactionOutcome, TransactionStatus};
pub use envelope::SubmitterIdentity;
pub use error::{ContractError, Result};
pub use invoker::{ContractInvoker, InvocationOutcome};
pub use nonce::NonceCoordinator;
pub use rpc::SorobanRpcClient;
