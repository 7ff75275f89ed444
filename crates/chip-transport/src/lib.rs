//! I/O-bound half of the chip-authorized NFT operations pipeline: ISO-7816
//! APDU transport (C5), the chip command state machine (C6), and reader
//! session lifecycle management (C7).

pub mod apdu;
pub mod chip;
pub mod error;
pub mod session;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

#[cfg(feature = "hardware")]
pub mod hardware;

pub use apdu::{ApduCommand, ApduResponse, Transport};
pub use chip::{ChipAuthRecord, ChipCommandHandler, ChipSignature};
pub use error::{Result, TransportError};
pub use session::{PollOutcome, ReaderBackend, ReaderSession, SessionEvent, SessionManager};
