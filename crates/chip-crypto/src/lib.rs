//! Pure cryptographic primitives behind the chip-authorized NFT operations
//! pipeline: hex/byte codec (C1), secp256k1 curve utilities (C2), DER parsing
//! (C3), SEP-53 message construction (C4), and recovery-id resolution (C8).
//!
//! Nothing in this crate performs I/O; it is deterministic and safe to unit
//! test exhaustively without a chip, a reader, or a network connection.

pub mod curve;
pub mod der;
pub mod error;
pub mod hexcodec;
pub mod recovery;
pub mod sep53;

pub use curve::{normalize_s, recover, PubKey65, HALF_N, N};
pub use error::{CryptoError, Result};
pub use hexcodec::{be_u32_to_bytes, const_eq, decode_hex, encode_hex};
pub use recovery::determine_rid;
pub use sep53::{build as build_sep53, FunctionName, Sep53Arg, Sep53Message};
