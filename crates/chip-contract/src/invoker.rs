//! C11: build, simulate, assemble, sign, submit, poll. Read-only calls stop
//! after simulate; writes go the whole way to a terminal transaction status.

use std::time::Duration;

use tracing::{instrument, warn};

use crate::abi::{self, ContractCall, ScVal};
use crate::backend::{ContractBackend, TransactionStatus};
use crate::envelope::{self, SubmitterIdentity};
use crate::error::{ContractError, Result};

const POLL_DELAY: Duration = Duration::from_secs(1);
const MIN_POLL_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    pub transaction_hash: String,
    pub result: Option<ScVal>,
}

pub struct ContractInvoker<'a> {
    backend: &'a dyn ContractBackend,
    contract_id: &'a str,
    poll_attempts: u32,
}

impl<'a> ContractInvoker<'a> {
    pub fn new(backend: &'a dyn ContractBackend, contract_id: &'a str) -> Self {
        Self { backend, contract_id, poll_attempts: MIN_POLL_ATTEMPTS }
    }

    /// Only for tests that need to exercise the timeout path without waiting
    /// through ten real polling attempts.
    #[cfg(test)]
    fn with_poll_attempts(mut self, attempts: u32) -> Self {
        self.poll_attempts = attempts;
        self
    }

    /// Runs a read-only call and returns its decoded return value without
    /// touching `submit`/`poll`.
    #[instrument(skip(self, call), fields(method = call.method))]
    pub async fn read(&self, call: &ContractCall) -> Result<ScVal> {
        let simulation = self.backend.simulate(self.contract_id, call.method, &call.args).await?;
        Ok(simulation.result)
    }

    /// Runs a state-changing call end to end: simulate, assemble + sign with
    /// the submitter identity, submit, then poll until a terminal status.
    #[instrument(skip(self, call, submitter), fields(method = call.method))]
    pub async fn invoke(&self, call: &ContractCall, submitter: &SubmitterIdentity) -> Result<InvocationOutcome> {
        if call.is_read_only() {
            let result = self.read(call).await?;
            return Ok(InvocationOutcome { transaction_hash: String::new(), result: Some(result) });
        }

        let simulation = self.backend.simulate(self.contract_id, call.method, &call.args).await?;
        let signed_envelope = envelope::assemble_and_sign(&simulation.transaction_data, submitter)?;
        let submitted = self.backend.submit_signed(&signed_envelope).await?;

        for attempt in 1..=self.poll_attempts {
            tokio::time::sleep(POLL_DELAY).await;
            let outcome = self.backend.get_transaction(&submitted.hash).await?;
            match outcome.status {
                TransactionStatus::Success => {
                    return Ok(InvocationOutcome { transaction_hash: submitted.hash, result: outcome.result });
                }
                TransactionStatus::Failed => {
                    if outcome.error_code == Some(abi::ERROR_CODE_REPLAY_NONCE) {
                        return Err(ContractError::ReplayNonce);
                    }
                    return Err(ContractError::Execution {
                        message: outcome.error_message.unwrap_or_else(|| "execution failed".to_string()),
                        code: outcome.error_code,
                    });
                }
                TransactionStatus::Pending => {
                    warn!(attempt, "transaction still pending, retrying");
                }
            }
        }

        Err(ContractError::PollTimeout(self.poll_attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SubmittedTransaction, TransactionOutcome};
    use crate::fake::FakeContractBackend;

    fn submitter() -> SubmitterIdentity {
        SubmitterIdentity::from_seed(&[3u8; 32])
    }

    #[tokio::test(start_paused = true)]
    async fn successful_invocation_polls_until_terminal_success() {
        let backend = FakeContractBackend::new();
        backend.script_simulation("mint", Ok(ScVal::Void));
        backend.script_submission(Ok(SubmittedTransaction { hash: "deadbeef".to_string() }));
        backend.script_poll(TransactionOutcome {
            status: TransactionStatus::Pending,
            result: None,
            error_code: None,
            error_message: None,
        });
        backend.script_poll(TransactionOutcome {
            status: TransactionStatus::Success,
            result: Some(ScVal::U64(42)),
            error_code: None,
            error_message: None,
        });

        let invoker = ContractInvoker::new(&backend, "CCONTRACT");
        let call = ContractCall { method: "mint", args: vec![] };
        let outcome = invoker.invoke(&call, &submitter()).await.unwrap();

        assert_eq!(outcome.transaction_hash, "deadbeef");
        assert_eq!(outcome.result, Some(ScVal::U64(42)));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_execution_surfaces_the_contract_error_code() {
        let backend = FakeContractBackend::new();
        backend.script_simulation("claim", Ok(ScVal::Void));
        backend.script_submission(Ok(SubmittedTransaction { hash: "abc123".to_string() }));
        backend.script_poll(TransactionOutcome {
            status: TransactionStatus::Failed,
            result: None,
            error_code: Some(7),
            error_message: Some("already claimed".to_string()),
        });

        let invoker = ContractInvoker::new(&backend, "CCONTRACT");
        let call = ContractCall { method: "claim", args: vec![] };
        let err = invoker.invoke(&call, &submitter()).await.unwrap_err();

        match err {
            ContractError::Execution { message, code } => {
                assert_eq!(message, "already claimed");
                assert_eq!(code, Some(7));
            }
            other => panic!("expected Execution, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn replay_nonce_failure_surfaces_as_replay_nonce() {
        let backend = FakeContractBackend::new();
        backend.script_simulation("mint", Ok(ScVal::Void));
        backend.script_submission(Ok(SubmittedTransaction { hash: "replayed".to_string() }));
        backend.script_poll(TransactionOutcome {
            status: TransactionStatus::Failed,
            result: None,
            error_code: Some(abi::ERROR_CODE_REPLAY_NONCE),
            error_message: Some("HostError: Error(Contract, #215)".to_string()),
        });

        let invoker = ContractInvoker::new(&backend, "CCONTRACT");
        let call = ContractCall { method: "mint", args: vec![] };
        let err = invoker.invoke(&call, &submitter()).await.unwrap_err();

        assert!(matches!(err, ContractError::ReplayNonce));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_poll_attempts_times_out() {
        let backend = FakeContractBackend::new();
        backend.script_simulation("transfer", Ok(ScVal::Void));
        backend.script_submission(Ok(SubmittedTransaction { hash: "h".to_string() }));
        for _ in 0..3 {
            backend.script_poll(TransactionOutcome {
                status: TransactionStatus::Pending,
                result: None,
                error_code: None,
                error_message: None,
            });
        }

        let invoker = ContractInvoker::new(&backend, "CCONTRACT").with_poll_attempts(3);
        let call = ContractCall { method: "transfer", args: vec![] };
        let err = invoker.invoke(&call, &submitter()).await.unwrap_err();

        assert!(matches!(err, ContractError::PollTimeout(3)));
    }

    #[tokio::test]
    async fn read_only_calls_skip_assemble_sign_submit() {
        let backend = FakeContractBackend::new();
        backend.script_simulation("owner_of", Ok(ScVal::Address("GABC".to_string())));

        let invoker = ContractInvoker::new(&backend, "CCONTRACT");
        let call = ContractCall::owner_of(9);
        let outcome = invoker.invoke(&call, &submitter()).await.unwrap();

        assert_eq!(outcome.transaction_hash, "");
        assert_eq!(outcome.result, Some(ScVal::Address("GABC".to_string())));
    }
}
