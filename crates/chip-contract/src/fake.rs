//! An in-memory `ContractBackend` double: every response is scripted ahead of
//! time, so `NonceCoordinator` and `ContractInvoker` can be exercised without
//! a network or a running Soroban node.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::abi::ScVal;
use crate::backend::{ContractBackend, Simulation, SubmittedTransaction, TransactionOutcome};
use crate::error::{ContractError, Result};

pub struct FakeContractBackend {
    simulations: Mutex<HashMap<String, VecDeque<std::result::Result<ScVal, String>>>>,
    submissions: Mutex<VecDeque<std::result::Result<SubmittedTransaction, String>>>,
    polls: Mutex<VecDeque<TransactionOutcome>>,
    pub simulate_calls: Mutex<Vec<(String, String)>>,
}

impl FakeContractBackend {
    pub fn new() -> Self {
        Self {
            simulations: Mutex::new(HashMap::new()),
            submissions: Mutex::new(VecDeque::new()),
            polls: Mutex::new(VecDeque::new()),
            simulate_calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues one simulation outcome for the next call to `method`. Multiple
    /// calls queue a FIFO sequence per method.
    pub fn script_simulation(&self, method: &str, outcome: std::result::Result<ScVal, String>) {
        self.simulations.lock().unwrap().entry(method.to_string()).or_default().push_back(outcome);
    }

    pub fn script_submission(&self, outcome: std::result::Result<SubmittedTransaction, String>) {
        self.submissions.lock().unwrap().push_back(outcome);
    }

    pub fn script_poll(&self, outcome: TransactionOutcome) {
        self.polls.lock().unwrap().push_back(outcome);
    }
}

impl Default for FakeContractBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractBackend for FakeContractBackend {
    async fn simulate(&self, contract_id: &str, method: &str, _args: &[ScVal]) -> Result<Simulation> {
        self.simulate_calls.lock().unwrap().push((contract_id.to_string(), method.to_string()));
        let mut simulations = self.simulations.lock().unwrap();
        let queue = simulations.entry(method.to_string()).or_default();
        let outcome = queue
            .pop_front()
            .ok_or_else(|| ContractError::Simulation(format!("no scripted simulation for {method}")))?;
        match outcome {
            Ok(result) => Ok(Simulation { transaction_data: "ZmFrZS1mb290cHJpbnQ=".to_string(), min_resource_fee: 100, result }),
            Err(message) => Err(ContractError::Simulation(message)),
        }
    }

    async fn submit_signed(&self, _signed_envelope_xdr: &str) -> Result<SubmittedTransaction> {
        let mut submissions = self.submissions.lock().unwrap();
        match submissions.pop_front() {
            Some(Ok(submitted)) => Ok(submitted),
            Some(Err(message)) => Err(ContractError::RpcError(message)),
            None => Err(ContractError::RpcError("no scripted submission".to_string())),
        }
    }

    async fn get_transaction(&self, _hash: &str) -> Result<TransactionOutcome> {
        let mut polls = self.polls.lock().unwrap();
        polls
            .pop_front()
            .ok_or_else(|| ContractError::RpcError("no scripted poll outcome".to_string()))
    }
}
