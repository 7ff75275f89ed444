//! C6 — chip command handler: drives the SELECT_APP -> GET_KEY_INFO (->
//! GENERATE_KEY*) -> GENERATE_SIGNATURE state machine described in spec.md
//! §4.6 over a [`Transport`].

use chip_crypto::PubKey65;
use tracing::{debug, instrument};

use crate::apdu::{ApduCommand, ApduResponse, Transport};
use crate::error::{Result, TransportError};

/// Conventional opcodes for this chip family. The instruction codes are
/// arbitrary within the ISO-7816 `INS` byte space; what matters is that every
/// call site goes through these constants instead of inlining magic bytes.
pub mod opcodes {
    pub const CLA: u8 = 0x80;
    pub const INS_SELECT_APP: u8 = 0xA4;
    pub const INS_GET_KEY_INFO: u8 = 0x10;
    pub const INS_GENERATE_KEY: u8 = 0x11;
    pub const INS_GENERATE_SIGNATURE: u8 = 0x12;

    /// Fixed 13-byte AID for this application.
    pub const AID: [u8; 13] = [
        0xA0, 0x00, 0x00, 0x08, 0x88, 0x01, 0x4E, 0x46, 0x54, 0x43, 0x48, 0x49, 0x50,
    ];
}

/// Everything the chip reports back about one of its key slots. Counters are
/// chip-maintained and informational; the host never writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipAuthRecord {
    pub public_key: PubKey65,
    pub global_counter: u32,
    pub key_counter: u32,
}

/// The parsed result of a `GENERATE_SIGNATURE` exchange: the record plus the
/// raw DER signature body the chip returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipSignature {
    pub global_counter: u32,
    pub key_counter: u32,
    pub der: Vec<u8>,
}

/// Drives one chip over a [`Transport`]. Stateless between calls: every
/// method issues `SELECT_APP` first, matching "PUBKEY_READY -(SELECT_APP)->
/// GENERATE_SIGNATURE" in the spec state diagram, since nothing here assumes
/// the chip remembers the previously selected application across an
/// intervening APDU from another part of the pipeline.
pub struct ChipCommandHandler<'a> {
    transport: &'a dyn Transport,
}

impl<'a> ChipCommandHandler<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    #[instrument(skip(self))]
    pub async fn select_app(&self) -> Result<()> {
        let cmd = ApduCommand::new(opcodes::CLA, opcodes::INS_SELECT_APP, 0x04, 0x00, opcodes::AID.to_vec());
        let resp = self.exchange(cmd).await?;
        debug!(sw = format!("{:#06X}", resp.sw), "SELECT_APP");
        resp.into_result().map(|_| ())
    }

    #[instrument(skip(self))]
    async fn get_key_info_raw(&self, key_index: u8) -> Result<ApduResponse> {
        let cmd = ApduCommand::new(opcodes::CLA, opcodes::INS_GET_KEY_INFO, key_index, 0x00, Vec::new());
        self.exchange(cmd).await
    }

    #[instrument(skip(self))]
    async fn generate_key_raw(&self) -> Result<ApduResponse> {
        let cmd = ApduCommand::new(opcodes::CLA, opcodes::INS_GENERATE_KEY, 0x00, 0x00, Vec::new());
        self.exchange(cmd).await
    }

    /// Reads the chip's record for `key_index`, auto-recovering by issuing
    /// `GENERATE_KEY` in a loop if the slot doesn't exist yet, until the
    /// chip reports either the record or a fatal "storage full".
    #[instrument(skip(self))]
    pub async fn ensure_key_ready(&self, key_index: u8) -> Result<ChipAuthRecord> {
        self.select_app().await?;
        loop {
            let resp = self.get_key_info_raw(key_index).await?;
            if resp.is_success() {
                return parse_key_info(&resp.body);
            }
            if resp.sw != ApduResponse::SW_KEY_NOT_AVAILABLE {
                return Err(TransportError::BadStatus { sw: resp.sw });
            }

            let gen = self.generate_key_raw().await?;
            if gen.sw == ApduResponse::SW_KEY_STORAGE_FULL {
                return Err(TransportError::Invariant("chip key storage is full"));
            }
            if !gen.is_success() {
                return Err(TransportError::BadStatus { sw: gen.sw });
            }
            // Loop back to GET_KEY_INFO; the chip has advanced its key index.
        }
    }

    /// Requests a signature over `msg_hash` from the key at `key_index`.
    /// Enforces the 32-byte hash invariant before issuing the sign APDU, per
    /// spec.md §4.6.
    #[instrument(skip(self, msg_hash))]
    pub async fn generate_signature(&self, key_index: u8, msg_hash: &[u8; 32]) -> Result<ChipSignature> {
        if msg_hash.len() != 32 {
            return Err(TransportError::Invariant("message hash must be exactly 32 bytes"));
        }
        self.select_app().await?;
        let cmd = ApduCommand::new(
            opcodes::CLA,
            opcodes::INS_GENERATE_SIGNATURE,
            key_index,
            0x00,
            msg_hash.to_vec(),
        )
        .with_le(0);
        let resp = self.exchange(cmd).await?;
        let body = resp.into_result()?;
        parse_signature(&body)
    }

    async fn exchange(&self, cmd: ApduCommand) -> Result<ApduResponse> {
        self.transport.exchange(&cmd).await
    }
}

fn parse_key_info(body: &[u8]) -> Result<ChipAuthRecord> {
    // global_counter(4) || key_counter(4) || 0x04 || X(32) || Y(32), though
    // some chip variants omit the 0x04 tag and send X(32) || Y(32) alone;
    // detect and normalize that shape by prepending the tag.
    if body.len() != 8 + 65 && body.len() != 8 + 64 {
        return Err(TransportError::MalformedResponse("GET_KEY_INFO body has unexpected length"));
    }
    let global_counter = u32::from_be_bytes(body[0..4].try_into().unwrap());
    let key_counter = u32::from_be_bytes(body[4..8].try_into().unwrap());
    let key_bytes = &body[8..];

    let mut public_key = [0u8; 65];
    if key_bytes.len() == 64 {
        public_key[0] = 0x04;
        public_key[1..].copy_from_slice(key_bytes);
    } else {
        if key_bytes[0] != 0x04 {
            return Err(TransportError::MalformedResponse("public key missing uncompressed-point prefix"));
        }
        public_key.copy_from_slice(key_bytes);
    }
    Ok(ChipAuthRecord { public_key, global_counter, key_counter })
}

fn parse_signature(body: &[u8]) -> Result<ChipSignature> {
    // global_counter(4) || key_counter(4) || DER_sig
    if body.len() <= 8 {
        return Err(TransportError::MalformedResponse("GENERATE_SIGNATURE body too short"));
    }
    let global_counter = u32::from_be_bytes(body[0..4].try_into().unwrap());
    let key_counter = u32::from_be_bytes(body[4..8].try_into().unwrap());
    let der = body[8..].to_vec();
    Ok(ChipSignature { global_counter, key_counter, der })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTransport;

    fn key_info_body(global: u32, key: u32, pubkey: &[u8; 65]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&global.to_be_bytes());
        body.extend_from_slice(&key.to_be_bytes());
        body.extend_from_slice(pubkey);
        body
    }

    #[tokio::test]
    async fn ensure_key_ready_recovers_from_missing_key() {
        let pubkey = [0x04u8; 65];
        let fake = FakeTransport::new(vec![
            // select_app
            (ApduResponse { body: vec![], sw: ApduResponse::SW_SUCCESS }),
            // get_key_info: not available yet
            (ApduResponse { body: vec![], sw: ApduResponse::SW_KEY_NOT_AVAILABLE }),
            // generate_key: success
            (ApduResponse { body: vec![], sw: ApduResponse::SW_SUCCESS }),
            // get_key_info: now available
            (ApduResponse { body: key_info_body(0, 1, &pubkey), sw: ApduResponse::SW_SUCCESS }),
        ]);

        let handler = ChipCommandHandler::new(&fake);
        let record = handler.ensure_key_ready(0).await.unwrap();
        assert_eq!(record.public_key, pubkey);
        assert_eq!(record.key_counter, 1);
    }

    #[tokio::test]
    async fn ensure_key_ready_normalizes_an_untagged_public_key() {
        let xy = [0x07u8; 64];
        let mut body = Vec::new();
        body.extend_from_slice(&0u32.to_be_bytes());
        body.extend_from_slice(&1u32.to_be_bytes());
        body.extend_from_slice(&xy);

        let fake = FakeTransport::new(vec![
            (ApduResponse { body: vec![], sw: ApduResponse::SW_SUCCESS }),
            (ApduResponse { body, sw: ApduResponse::SW_SUCCESS }),
        ]);

        let handler = ChipCommandHandler::new(&fake);
        let record = handler.ensure_key_ready(0).await.unwrap();
        assert_eq!(record.public_key[0], 0x04);
        assert_eq!(&record.public_key[1..], &xy[..]);
    }

    #[tokio::test]
    async fn ensure_key_ready_surfaces_storage_full_as_fatal() {
        let fake = FakeTransport::new(vec![
            (ApduResponse { body: vec![], sw: ApduResponse::SW_SUCCESS }),
            (ApduResponse { body: vec![], sw: ApduResponse::SW_KEY_NOT_AVAILABLE }),
            (ApduResponse { body: vec![], sw: ApduResponse::SW_KEY_STORAGE_FULL }),
        ]);

        let handler = ChipCommandHandler::new(&fake);
        assert!(handler.ensure_key_ready(0).await.is_err());
    }

    #[tokio::test]
    async fn generate_signature_parses_counters_and_der_body() {
        let mut body = Vec::new();
        body.extend_from_slice(&7u32.to_be_bytes());
        body.extend_from_slice(&3u32.to_be_bytes());
        body.extend_from_slice(&[0x30, 0x02, 0x02, 0x00]);

        let fake = FakeTransport::new(vec![
            (ApduResponse { body: vec![], sw: ApduResponse::SW_SUCCESS }),
            (ApduResponse { body, sw: ApduResponse::SW_SUCCESS }),
        ]);

        let handler = ChipCommandHandler::new(&fake);
        let sig = handler.generate_signature(0, &[0u8; 32]).await.unwrap();
        assert_eq!(sig.global_counter, 7);
        assert_eq!(sig.key_counter, 3);
        assert_eq!(sig.der, vec![0x30, 0x02, 0x02, 0x00]);
    }
}
