//! Wires the pure crypto (`chip-crypto`), chip I/O (`chip-transport`), and
//! contract invocation (`chip-contract`) crates into the end-to-end
//! orchestrator (C10) behind one unified error taxonomy (C12).

pub mod error;
pub mod orchestrator;

pub use error::{ChipAgentError, Result};
pub use orchestrator::{OperationOrchestrator, OperationRequest, OrchestratorContext};
