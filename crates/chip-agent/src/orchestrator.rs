//! C10: the per-operation pipeline that binds a user intent to the chip, the
//! nonce coordinator, and the contract invoker. Every operation — mint,
//! claim, transfer — runs the same nine steps; only the assembled
//! `ContractCall` differs.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{info, instrument};

use chip_contract::{ContractBackend, ContractCall, ContractInvoker, InvocationOutcome, NonceCoordinator, SubmitterIdentity};
use chip_crypto::{build_sep53, determine_rid, normalize_s, FunctionName};
use chip_transport::{ChipCommandHandler, ReaderBackend, SessionManager, SessionEvent, Transport};

use crate::error::{ChipAgentError, Result};

/// One of the three user-facing operations this agent drives end to end.
#[derive(Debug, Clone)]
pub enum OperationRequest {
    Mint { to: String },
    Claim { claimant: String, token_id: u64 },
    Transfer { from: String, to: String, token_id: u64 },
}

impl OperationRequest {
    fn function_name(&self) -> FunctionName {
        match self {
            OperationRequest::Mint { .. } => FunctionName::Mint,
            OperationRequest::Claim { .. } => FunctionName::Claim,
            OperationRequest::Transfer { .. } => FunctionName::Transfer,
        }
    }
}

pub struct OrchestratorContext<'a> {
    pub session_manager: Arc<SessionManager>,
    pub reader_backend: Arc<dyn ReaderBackend>,
    pub contract_backend: &'a dyn ContractBackend,
    pub contract_id: &'a str,
    pub network_passphrase: &'a str,
    pub key_index: u8,
    pub submitter: &'a SubmitterIdentity,
}

pub struct OperationOrchestrator<'a> {
    ctx: OrchestratorContext<'a>,
}

impl<'a> OperationOrchestrator<'a> {
    pub fn new(ctx: OrchestratorContext<'a>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(operation = ?request))]
    pub async fn run(&self, request: OperationRequest) -> Result<InvocationOutcome> {
        // Step 1: open reader session.
        let session = self.ctx.session_manager.open_session(self.ctx.reader_backend.clone())?;
        let (_cancel_tx, cancel_rx) = oneshot::channel();
        let event = session.run(cancel_rx).await;
        let transport: Arc<dyn Transport> = match event {
            SessionEvent::TagReady(transport) => transport,
            SessionEvent::UserCancelled => return Err(ChipAgentError::UserCancelled),
            SessionEvent::Timeout => return Err(ChipAgentError::Timeout("reader watchdog elapsed".to_string())),
            SessionEvent::Error(e) => return Err(e.into()),
        };

        let handler = ChipCommandHandler::new(transport.as_ref());

        // Step 2: read chip public key. `PubKey65` is a fixed 65-byte array,
        // so only the leading-byte invariant needs an explicit check here;
        // `chip-transport` already rejects a malformed length at the source.
        let record = handler.ensure_key_ready(self.ctx.key_index).await?;
        if record.public_key[0] != 0x04 {
            return Err(ChipAgentError::Validation("chip public key is not an uncompressed point".to_string()));
        }

        // Step 3: resolve next nonce.
        let nonce_coordinator = NonceCoordinator::new(self.ctx.contract_backend, self.ctx.contract_id);
        let nonce = nonce_coordinator.next_nonce(record.public_key).await?;

        // Step 4: build SEP-53 message + hash.
        let args = self.sep53_args(&request);
        let message = build_sep53(
            self.ctx.contract_id,
            request.function_name(),
            &args,
            nonce,
            self.ctx.network_passphrase,
        )?;

        // Step 5: request chip signature, parse DER.
        let signature = handler.generate_signature(self.ctx.key_index, &message.message_hash).await?;
        let (r, s) = chip_crypto::der::parse(&signature.der)?;
        info!(key_counter = signature.key_counter, "chip produced a signature");

        // Step 6: normalize s, assemble the 64-byte signature.
        let s_low = normalize_s(&s);
        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(&r);
        sig[32..].copy_from_slice(&s_low);

        // Step 7: resolve the recovery id against the public key from step 2.
        let rid = determine_rid(&message.message_hash, &r, &s_low, &record.public_key)?;

        // Step 8: hand off to the contract invoker.
        let call = self.contract_call(&request, message.message.clone(), sig, rid as u32, record.public_key, nonce);
        let invoker = ContractInvoker::new(self.ctx.contract_backend, self.ctx.contract_id);
        let outcome = invoker.invoke(&call, self.ctx.submitter).await?;

        // Step 9: success, session drops (and is invalidated) at scope exit.
        Ok(outcome)
    }

    fn sep53_args(&self, request: &OperationRequest) -> Vec<chip_crypto::Sep53Arg> {
        use chip_crypto::Sep53Arg;
        match request {
            OperationRequest::Mint { to } => vec![Sep53Arg::Address(to.clone())],
            OperationRequest::Claim { claimant, token_id } => {
                vec![Sep53Arg::Address(claimant.clone()), Sep53Arg::Integer(*token_id)]
            }
            OperationRequest::Transfer { from, to, token_id } => {
                vec![Sep53Arg::Address(from.clone()), Sep53Arg::Address(to.clone()), Sep53Arg::Integer(*token_id)]
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn contract_call(
        &self,
        request: &OperationRequest,
        message: Vec<u8>,
        sig: [u8; 64],
        rid: u32,
        public_key: chip_crypto::PubKey65,
        nonce: u32,
    ) -> ContractCall {
        match request {
            OperationRequest::Mint { to } => ContractCall::mint(to.clone(), message, sig, rid, public_key, nonce),
            OperationRequest::Claim { claimant, .. } => {
                ContractCall::claim(claimant.clone(), message, sig, rid, public_key, nonce)
            }
            OperationRequest::Transfer { from, to, token_id } => {
                ContractCall::transfer(from.clone(), to.clone(), *token_id, message, sig, rid, public_key, nonce)
            }
        }
    }
}
