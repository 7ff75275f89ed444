//! A2: the CLI's configuration surface. Flags first, `CHIP_AGENT_*`
//! environment variables as fallback, an optional `.env` file loaded before
//! parsing — the same layering `clap`'s `env` attribute gives any small
//! network-agent CLI.

use clap::{Parser, ValueEnum};
use url::Url;
use zeroize::Zeroize;

use chip_agent::ChipAgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Testnet,
    Mainnet,
    Futurenet,
}

impl Network {
    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Testnet => "Test SDF Network ; September 2015",
            Network::Mainnet => "Public Global Stellar Network ; September 2015",
            Network::Futurenet => "Test SDF Future Network ; October 2022",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "chip-agent-cli", about = "Drives a chip-authorized NFT operation over a secp256k1 security chip")]
pub struct CliArgs {
    #[arg(long, env = "CHIP_AGENT_NETWORK", value_enum)]
    pub network: Network,

    #[arg(long, env = "CHIP_AGENT_RPC_URL")]
    pub rpc_url: String,

    #[arg(long, env = "CHIP_AGENT_HORIZON_URL")]
    pub horizon_url: String,

    #[arg(long, env = "CHIP_AGENT_CONTRACT_ID")]
    pub contract_id: String,

    /// Raw 32-byte ed25519 seed, hex-encoded. In production this comes from a
    /// platform keychain; this CLI only ever reads it from configuration.
    #[arg(long, env = "CHIP_AGENT_SUBMITTER_SECRET")]
    pub submitter_secret: String,

    #[arg(long, default_value_t = 0)]
    pub key_index: u8,
}

/// The validated configuration an operation actually runs against.
pub struct AgentConfig {
    pub network: Network,
    pub rpc_url: Url,
    pub horizon_url: Url,
    pub contract_id: String,
    pub submitter_seed: [u8; 32],
    pub key_index: u8,
}

impl AgentConfig {
    pub fn from_args(args: CliArgs) -> chip_agent::Result<Self> {
        let rpc_url = Url::parse(&args.rpc_url)
            .map_err(|e| ChipAgentError::Validation(format!("rpc_url is not a valid URL: {e}")))?;
        let horizon_url = Url::parse(&args.horizon_url)
            .map_err(|e| ChipAgentError::Validation(format!("horizon_url is not a valid URL: {e}")))?;

        let contract_bytes = chip_crypto::decode_hex(&args.contract_id)
            .map_err(|e| ChipAgentError::Validation(format!("contract_id: {e}")))?;
        if contract_bytes.len() != 32 {
            return Err(ChipAgentError::Validation("contract_id must decode to exactly 32 bytes".to_string()));
        }

        let mut args = args;
        if args.submitter_secret.trim().is_empty() {
            return Err(ChipAgentError::Validation("submitter_secret must not be empty".to_string()));
        }
        let mut seed_bytes = chip_crypto::decode_hex(&args.submitter_secret)
            .map_err(|e| ChipAgentError::Validation(format!("submitter_secret: {e}")))?;
        args.submitter_secret.zeroize();
        if seed_bytes.len() != 32 {
            seed_bytes.zeroize();
            return Err(ChipAgentError::Validation("submitter_secret must decode to exactly 32 bytes".to_string()));
        }
        let mut submitter_seed = [0u8; 32];
        submitter_seed.copy_from_slice(&seed_bytes);
        seed_bytes.zeroize();

        Ok(Self {
            network: args.network,
            rpc_url,
            horizon_url,
            contract_id: args.contract_id,
            submitter_seed,
            key_index: args.key_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_args() -> CliArgs {
        CliArgs {
            network: Network::Testnet,
            rpc_url: "https://soroban-testnet.stellar.org".to_string(),
            horizon_url: "https://horizon-testnet.stellar.org".to_string(),
            contract_id: "00".repeat(32),
            submitter_secret: "11".repeat(32),
            key_index: 0,
        }
    }

    #[test]
    fn accepts_a_well_formed_configuration() {
        assert!(AgentConfig::from_args(valid_args()).is_ok());
    }

    #[test]
    fn rejects_a_short_contract_id() {
        let mut args = valid_args();
        args.contract_id = "00".to_string();
        assert!(AgentConfig::from_args(args).is_err());
    }

    #[test]
    fn rejects_a_malformed_rpc_url() {
        let mut args = valid_args();
        args.rpc_url = "not a url".to_string();
        assert!(AgentConfig::from_args(args).is_err());
    }

    #[test]
    fn rejects_an_empty_submitter_secret() {
        let mut args = valid_args();
        args.submitter_secret = "".to_string();
        assert!(AgentConfig::from_args(args).is_err());
    }
}
