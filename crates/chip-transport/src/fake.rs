//! In-memory [`Transport`] used by tests across this crate and by
//! `chip-agent`'s integration tests. Scripted with a queue of canned
//! responses; each `exchange` call pops the next one.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::apdu::{ApduCommand, ApduResponse, Transport};
use crate::error::{Result, TransportError};

pub struct FakeTransport {
    responses: Mutex<Vec<ApduResponse>>,
    exchanges: Mutex<Vec<ApduCommand>>,
}

impl FakeTransport {
    /// `responses` are popped front-to-back as `exchange` is called.
    pub fn new(responses: Vec<ApduResponse>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self { responses: Mutex::new(responses), exchanges: Mutex::new(Vec::new()) }
    }

    pub fn exchanges(&self) -> Vec<ApduCommand> {
        self.exchanges.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn exchange(&self, command: &ApduCommand) -> Result<ApduResponse> {
        self.exchanges.lock().unwrap().push(command.clone());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or(TransportError::NotConnected)
    }
}
