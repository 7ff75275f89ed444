//! C9: reads the contract's current nonce for a chip key and computes the
//! next one to sign. A chip key the contract has never seen simulates
//! `get_nonce` to a `Void` or missing result, which this module treats as
//! nonce zero.

use tracing::instrument;

use chip_crypto::PubKey65;

use crate::abi::{ContractCall, ScVal};
use crate::backend::ContractBackend;
use crate::error::Result;

pub struct NonceCoordinator<'a> {
    backend: &'a dyn ContractBackend,
    contract_id: &'a str,
}

impl<'a> NonceCoordinator<'a> {
    pub fn new(backend: &'a dyn ContractBackend, contract_id: &'a str) -> Self {
        Self { backend, contract_id }
    }

    /// The nonce a fresh signature for `public_key` must carry — the
    /// contract's stored value plus one, or `0` if the key has never signed.
    #[instrument(skip(self, public_key))]
    pub async fn next_nonce(&self, public_key: PubKey65) -> Result<u32> {
        let call = ContractCall::get_nonce(public_key);
        let simulation = self.backend.simulate(self.contract_id, call.method, &call.args).await?;
        match simulation.result {
            ScVal::U32(stored) => Ok(stored + 1),
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeContractBackend;

    fn pubkey() -> PubKey65 {
        let mut k = [0u8; 65];
        k[0] = 0x04;
        k
    }

    #[tokio::test]
    async fn unknown_key_bootstraps_to_nonce_zero() {
        let backend = FakeContractBackend::new();
        backend.script_simulation("get_nonce", Ok(ScVal::Void));
        let coordinator = NonceCoordinator::new(&backend, "CCONTRACT");
        let next = coordinator.next_nonce(pubkey()).await.unwrap();
        assert_eq!(next, 0);
    }

    #[tokio::test]
    async fn known_key_advances_past_the_stored_value() {
        let backend = FakeContractBackend::new();
        backend.script_simulation("get_nonce", Ok(ScVal::U32(7)));
        let coordinator = NonceCoordinator::new(&backend, "CCONTRACT");
        let next = coordinator.next_nonce(pubkey()).await.unwrap();
        assert_eq!(next, 8);
    }
}
