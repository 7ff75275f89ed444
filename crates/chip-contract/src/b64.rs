//! XDR on the wire is always base64 text; this wraps the `base64` engine API
//! so callers never have to import `Engine` themselves.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn encode<T: AsRef<[u8]>>(input: T) -> String {
    STANDARD.encode(input)
}

pub fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(input)
}
