use thiserror::Error;

/// Narrow error type for the transport and chip-command layers.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("reader I/O error: {0}")]
    Io(String),

    #[error("no reader/tag connected")]
    NotConnected,

    #[error("chip returned status word {sw:#06X}")]
    BadStatus { sw: u16 },

    #[error("chip response malformed: {0}")]
    MalformedResponse(&'static str),

    #[error("invariant violated: {0}")]
    Invariant(&'static str),

    #[error("more than one tag in the field")]
    MultipleTags,

    #[error("session watchdog timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("user cancelled the session")]
    UserCancelled,

    #[error("a reader session is already active")]
    SessionAlreadyActive,
}

pub type Result<T> = std::result::Result<T, TransportError>;
