//! Text form of digests embedded in sanitized documents.
//!
//! Standard base64 without padding, with `/` and `+` swapped for `_` and `.`
//! so the result survives URL paths and template engines untouched.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;

use crate::error::{GatewayError, Result};

pub fn encode_hash(bytes: &[u8]) -> String {
    STANDARD_NO_PAD
        .encode(bytes)
        .chars()
        .map(|c| match c {
            '/' => '_',
            '+' => '.',
            other => other,
        })
        .collect()
}

pub fn decode_hash(encoded: &str) -> Result<Vec<u8>> {
    let restored: String = encoded
        .chars()
        .map(|c| match c {
            '_' => '/',
            '.' => '+',
            other => other,
        })
        .collect();
    STANDARD_NO_PAD
        .decode(restored.as_bytes())
        .map_err(|e| GatewayError::Decode {
            reason: format!("invalid hash encoding: {e}"),
        })
}
