//! C5 — ISO-7816 APDU transport: frame construction, exchange with a
//! connected tag, status-word decoding.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::{Result, TransportError};

/// A command APDU in the case-4 shape this chip family uses: `CLA INS P1 P2
/// Lc data Le`. `le` is `None` when the command has no expected response
/// body length beyond the status word.
#[derive(Clone, Debug)]
pub struct ApduCommand {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
    pub le: Option<u8>,
}

impl ApduCommand {
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8, data: Vec<u8>) -> Self {
        Self { cla, ins, p1, p2, data, le: None }
    }

    pub fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Encodes the command as raw bytes. Short-form `Lc`/`Le` only: every
    /// command this chip family accepts has a body under 256 bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 + self.data.len() + 1);
        out.push(self.cla);
        out.push(self.ins);
        out.push(self.p1);
        out.push(self.p2);
        out.push(self.data.len() as u8);
        out.extend_from_slice(&self.data);
        if let Some(le) = self.le {
            out.push(le);
        }
        out
    }
}

/// The response to an APDU exchange: the body (without the trailing status
/// word) and the decoded status word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApduResponse {
    pub body: Vec<u8>,
    pub sw: u16,
}

impl ApduResponse {
    pub const SW_SUCCESS: u16 = 0x9000;
    /// Device-specific: key with the requested index is not available yet.
    pub const SW_KEY_NOT_AVAILABLE: u16 = 0x6A88;
    /// Device-specific: no more key slots can be generated.
    pub const SW_KEY_STORAGE_FULL: u16 = 0x6A84;

    pub fn is_success(&self) -> bool {
        self.sw == Self::SW_SUCCESS
    }

    /// Splits a raw response buffer (`body || SW1 || SW2`) into body and SW.
    pub fn from_raw(mut raw: Vec<u8>) -> Result<Self> {
        if raw.len() < 2 {
            return Err(TransportError::MalformedResponse("response shorter than the status word"));
        }
        let sw2 = raw.pop().unwrap();
        let sw1 = raw.pop().unwrap();
        let sw = ((sw1 as u16) << 8) | sw2 as u16;
        Ok(Self { body: raw, sw })
    }

    pub fn into_result(self) -> Result<Vec<u8>> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(TransportError::BadStatus { sw: self.sw })
        }
    }
}

/// Abstracts the physical/logical link to a connected tag. Implementations
/// never interpret the APDU payload; they only move bytes and surface the
/// raw status word, per the "typed errors vs. status-word strings" design
/// note — human-readable formatting happens above this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, command: &ApduCommand) -> Result<ApduResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_short_form_command() {
        let cmd = ApduCommand::new(0x00, 0xA4, 0x04, 0x00, vec![1, 2, 3]).with_le(0);
        assert_eq!(cmd.encode(), vec![0x00, 0xA4, 0x04, 0x00, 0x03, 1, 2, 3, 0x00]);
    }

    #[test]
    fn splits_body_and_status_word() {
        let raw = vec![0xAA, 0xBB, 0x90, 0x00];
        let resp = ApduResponse::from_raw(raw).unwrap();
        assert_eq!(resp.body, vec![0xAA, 0xBB]);
        assert!(resp.is_success());
    }

    #[test]
    fn rejects_undersized_response() {
        assert!(ApduResponse::from_raw(vec![0x90]).is_err());
    }
}
