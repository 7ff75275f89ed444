mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chip_agent::{ChipAgentError, OperationOrchestrator, OperationRequest, OrchestratorContext};
use chip_contract::{SorobanRpcClient, SubmitterIdentity};
use chip_transport::SessionManager;

use config::{AgentConfig, CliArgs};

#[derive(Debug, Subcommand)]
enum Operation {
    Mint { to: String },
    Claim { claimant: String, token_id: u64 },
    Transfer { from: String, to: String, token_id: u64 },
}

#[derive(Debug, Parser)]
struct Cli {
    #[command(flatten)]
    config: CliArgs,

    #[command(subcommand)]
    operation: Operation,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AgentConfig::from_args(cli.config)?;

    let request = match cli.operation {
        Operation::Mint { to } => OperationRequest::Mint { to },
        Operation::Claim { claimant, token_id } => OperationRequest::Claim { claimant, token_id },
        Operation::Transfer { from, to, token_id } => OperationRequest::Transfer { from, to, token_id },
    };

    let contract_backend = SorobanRpcClient::new(config.rpc_url.clone());
    let submitter = SubmitterIdentity::from_seed(&config.submitter_seed);
    let session_manager = Arc::new(SessionManager::new());
    let reader_backend = build_reader_backend()?;

    let ctx = OrchestratorContext {
        session_manager,
        reader_backend,
        contract_backend: &contract_backend,
        contract_id: &config.contract_id,
        network_passphrase: config.network.passphrase(),
        key_index: config.key_index,
        submitter: &submitter,
    };
    let orchestrator = OperationOrchestrator::new(ctx);

    let outcome = orchestrator.run(request).await?;
    info!(hash = %outcome.transaction_hash, "operation submitted");
    println!("{}", outcome.transaction_hash);

    Ok(())
}

#[cfg(feature = "hardware")]
fn build_reader_backend() -> chip_agent::Result<Arc<dyn chip_transport::ReaderBackend>> {
    let backend = chip_transport::hardware::PcscBackend::first_available()
        .map_err(|e| ChipAgentError::Transport(e.to_string()))?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "hardware"))]
fn build_reader_backend() -> chip_agent::Result<Arc<dyn chip_transport::ReaderBackend>> {
    Err(ChipAgentError::Validation(
        "no reader backend is compiled in; rebuild with --features hardware".to_string(),
    ))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
