//! The contract call ABI from spec.md §6: argument vectors are
//! order-sensitive and use the types named in that table. This module is the
//! only place that is allowed to know the argument order for `mint`,
//! `claim`, and `transfer`.

use chip_crypto::PubKey65;

/// A Stellar account or contract address in its strkey (`G...`/`C...`) form.
pub type Address = String;

/// The contract error code this agent's companion contract reserves for a
/// rejected replay nonce, distinct from other execution failures (e.g. a bad
/// signature) so the host can tell the two apart.
pub const ERROR_CODE_REPLAY_NONCE: i32 = 215;

/// One Soroban contract-call argument. A minimal subset of `ScVal` — just
/// the shapes this contract's ABI actually uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScVal {
    Address(Address),
    Bytes(Vec<u8>),
    U32(u32),
    U64(u64),
    Void,
}

/// A fully-bound contract invocation, ready to simulate or submit.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub method: &'static str,
    pub args: Vec<ScVal>,
}

impl ContractCall {
    pub fn mint(to: Address, message: Vec<u8>, signature: [u8; 64], recovery_id: u32, public_key: PubKey65, nonce: u32) -> Self {
        Self {
            method: "mint",
            args: vec![
                ScVal::Address(to),
                ScVal::Bytes(message),
                ScVal::Bytes(signature.to_vec()),
                ScVal::U32(recovery_id),
                ScVal::Bytes(public_key.to_vec()),
                ScVal::U32(nonce),
            ],
        }
    }

    pub fn claim(
        claimant: Address,
        message: Vec<u8>,
        signature: [u8; 64],
        recovery_id: u32,
        public_key: PubKey65,
        nonce: u32,
    ) -> Self {
        Self {
            method: "claim",
            args: vec![
                ScVal::Address(claimant),
                ScVal::Bytes(message),
                ScVal::Bytes(signature.to_vec()),
                ScVal::U32(recovery_id),
                ScVal::Bytes(public_key.to_vec()),
                ScVal::U32(nonce),
            ],
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        from: Address,
        to: Address,
        token_id: u64,
        message: Vec<u8>,
        signature: [u8; 64],
        recovery_id: u32,
        public_key: PubKey65,
        nonce: u32,
    ) -> Self {
        Self {
            method: "transfer",
            args: vec![
                ScVal::Address(from),
                ScVal::Address(to),
                ScVal::U64(token_id),
                ScVal::Bytes(message),
                ScVal::Bytes(signature.to_vec()),
                ScVal::U32(recovery_id),
                ScVal::Bytes(public_key.to_vec()),
                ScVal::U32(nonce),
            ],
        }
    }

    pub fn get_nonce(public_key: PubKey65) -> Self {
        Self { method: "get_nonce", args: vec![ScVal::Bytes(public_key.to_vec())] }
    }

    pub fn owner_of(token_id: u64) -> Self {
        Self { method: "owner_of", args: vec![ScVal::U64(token_id)] }
    }

    pub fn token_uri(token_id: u64) -> Self {
        Self { method: "token_uri", args: vec![ScVal::U64(token_id)] }
    }

    /// A write call changes contract state and must go through
    /// simulate -> assemble -> sign -> submit -> poll; a read-only call can
    /// stop after simulate.
    pub fn is_read_only(&self) -> bool {
        matches!(self.method, "get_nonce" | "owner_of" | "token_uri" | "balance")
    }
}
