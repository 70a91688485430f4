//! Lowercase hex encoding for keys, nonces, and ciphertexts.

use crate::Error;

/// Encodes `data` as lowercase hex.
#[must_use]
pub fn to_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(data)
}

/// Decodes a hex string, ignoring surrounding whitespace. Either case is accepted.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if `s` has an odd length or contains a non-hex character.
pub fn from_hex(s: &str) -> Result<Vec<u8>, Error> {
    Ok(hex::decode(s.trim())?)
}
