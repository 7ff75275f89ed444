//! C4 — SEP-53 message builder: deterministic construction of the chip's
//! authorization message and its SHA-256 hash.

use sha2::{Digest, Sha256};

use crate::error::{CryptoError, Result};
use crate::hexcodec::decode_hex;

/// One argument of a SEP-53 message: either a Stellar address (`G...`/`C...`)
/// or a decimal-string-encoded integer. Both are plain strings in the wire
/// encoding; the variant only documents intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sep53Arg {
    Address(String),
    Integer(u64),
}

impl Sep53Arg {
    fn as_json_string(&self) -> String {
        match self {
            Sep53Arg::Address(addr) => addr.clone(),
            Sep53Arg::Integer(n) => n.to_string(),
        }
    }
}

/// The function names the on-chain contract accepts; fixed, lowercase ASCII
/// literals per spec.md §3 — never constructed from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    Mint,
    Claim,
    Transfer,
}

impl FunctionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionName::Mint => "mint",
            FunctionName::Claim => "claim",
            FunctionName::Transfer => "transfer",
        }
    }
}

/// The output of building a SEP-53 message: the octet string and its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sep53Message {
    pub message: Vec<u8>,
    pub message_hash: [u8; 32],
}

/// Builds the SEP-53 authorization message and its hash.
///
/// `message = SHA256(network_passphrase) || contract_id(32) || function_name
/// || json_encode(args) || nonce_be32`; `message_hash = SHA256(message)`.
pub fn build(
    contract_id_hex: &str,
    function_name: FunctionName,
    args: &[Sep53Arg],
    nonce: u32,
    network_passphrase: &str,
) -> Result<Sep53Message> {
    let h_net = Sha256::digest(network_passphrase.as_bytes());
    if h_net.len() != 32 {
        return Err(CryptoError::BadNetworkHash);
    }

    let contract_id = decode_hex(contract_id_hex)?;
    if contract_id.len() != 32 {
        return Err(CryptoError::BadContractId);
    }

    let json_args: Vec<String> = args.iter().map(Sep53Arg::as_json_string).collect();
    let encoded_args = serde_json::to_vec(&json_args)?;

    let mut message = Vec::with_capacity(32 + 32 + function_name.as_str().len() + encoded_args.len() + 4);
    message.extend_from_slice(&h_net);
    message.extend_from_slice(&contract_id);
    message.extend_from_slice(function_name.as_str().as_bytes());
    message.extend_from_slice(&encoded_args);
    message.extend_from_slice(&nonce.to_be_bytes());

    let message_hash: [u8; 32] = Sha256::digest(&message).into();

    Ok(Sep53Message { message, message_hash })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

    #[test]
    fn builds_deterministic_mint_message() {
        let contract_id = "00".repeat(32);
        let args = [Sep53Arg::Address(
            "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF".to_string(),
        )];

        let built = build(&contract_id, FunctionName::Mint, &args, 1, TESTNET_PASSPHRASE).unwrap();
        let again = build(&contract_id, FunctionName::Mint, &args, 1, TESTNET_PASSPHRASE).unwrap();

        assert_eq!(built, again);
        assert_eq!(built.message_hash.len(), 32);

        let expected_json_len = serde_json::to_vec(&vec![args[0].as_json_string()]).unwrap().len();
        assert_eq!(built.message.len(), 32 + 32 + 4 + expected_json_len + 4);
    }

    #[test]
    fn any_byte_change_flips_the_hash() {
        let contract_id = "11".repeat(32);
        let args = [Sep53Arg::Integer(42)];

        let a = build(&contract_id, FunctionName::Claim, &args, 5, TESTNET_PASSPHRASE).unwrap();
        let b = build(&contract_id, FunctionName::Claim, &args, 6, TESTNET_PASSPHRASE).unwrap();

        assert_ne!(a.message_hash, b.message_hash);
    }

    #[test]
    fn rejects_short_contract_id() {
        let args = [Sep53Arg::Integer(1)];
        assert!(build("00", FunctionName::Transfer, &args, 1, TESTNET_PASSPHRASE).is_err());
    }

    #[test]
    fn json_array_has_no_whitespace() {
        let json = serde_json::to_string(&vec!["a".to_string(), "1".to_string()]).unwrap();
        assert_eq!(json, r#"["a","1"]"#);
    }
}
