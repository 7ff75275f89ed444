//! Real [`ReaderBackend`]/[`Transport`] implementation over PC/SC, the
//! standard way a userspace process on Linux/macOS/Windows talks to a
//! contactless (ISO-14443) reader. Gated behind the `hardware` feature so the
//! rest of the workspace builds and tests without the native PC/SC library.

use async_trait::async_trait;
use pcsc::{Card, Context, Protocols, ReaderState, Scope, ShareMode, State};
use std::ffi::CString;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::apdu::{ApduCommand, ApduResponse, Transport};
use crate::error::{Result, TransportError};
use crate::session::{PollOutcome, ReaderBackend};

fn pcsc_err(context: &str, err: pcsc::Error) -> TransportError {
    TransportError::Io(format!("{context}: {err}"))
}

/// One physical PC/SC-visible reader, polled for card presence.
pub struct PcscBackend {
    ctx: Context,
    reader_state: Mutex<ReaderState>,
}

impl PcscBackend {
    /// Connects to the first reader the PC/SC resource manager reports.
    pub fn first_available() -> Result<Self> {
        let ctx = Context::establish(Scope::User).map_err(|e| pcsc_err("establish context", e))?;
        let mut buf = vec![0u8; 2048];
        let readers = ctx.list_readers(&mut buf).map_err(|e| pcsc_err("list readers", e))?;
        let name = readers
            .into_iter()
            .next()
            .ok_or(TransportError::NotConnected)?
            .to_owned();
        Ok(Self {
            ctx,
            reader_state: Mutex::new(ReaderState::new(name, State::UNAWARE)),
        })
    }
}

#[async_trait]
impl ReaderBackend for PcscBackend {
    async fn begin(&self) -> Result<()> {
        debug!("starting PC/SC poll");
        Ok(())
    }

    async fn poll_once(&self) -> Result<PollOutcome> {
        let ctx = &self.ctx;
        let mut state = self.reader_state.lock().unwrap();
        state.sync_current_state();

        match ctx.get_status_change(Duration::from_millis(100), std::slice::from_mut(&mut state)) {
            Ok(()) => {}
            Err(pcsc::Error::Timeout) => return Ok(PollOutcome::Pending),
            Err(e) => return Err(pcsc_err("get_status_change", e)),
        }

        let event = state.event_state();
        if event.contains(State::PRESENT) {
            let reader_name = CString::new(state.name().to_bytes()).unwrap();
            let card = ctx
                .connect(&reader_name, ShareMode::Shared, Protocols::ANY)
                .map_err(|e| pcsc_err("connect", e))?;
            return Ok(PollOutcome::TagConnected(std::sync::Arc::new(PcscTransport { card })));
        }
        if event.contains(State::MUTE) {
            return Ok(PollOutcome::CardRemoved);
        }
        Ok(PollOutcome::Pending)
    }

    async fn invalidate(&self, reason: &str) {
        debug!(reason, "tearing down PC/SC poll");
    }
}

/// A connected card/tag, speaking raw APDUs over PC/SC's `transmit`.
pub struct PcscTransport {
    card: Card,
}

#[async_trait]
impl Transport for PcscTransport {
    async fn exchange(&self, command: &ApduCommand) -> Result<ApduResponse> {
        let request = command.encode();
        let mut recv_buf = vec![0u8; 4096];
        let response = self
            .card
            .transmit(&request, &mut recv_buf)
            .map_err(|e| pcsc_err("transmit", e))?;
        if response.len() < 2 {
            warn!("PC/SC response shorter than a status word");
        }
        ApduResponse::from_raw(response.to_vec())
    }
}
