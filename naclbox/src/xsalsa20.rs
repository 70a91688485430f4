//! XSalsa20, Salsa20 extended to 192-bit nonces via an HSalsa20 sub-key.

use zeroize::Zeroize;

use crate::salsa20::{self, SIGMA};
use crate::{Error, KEY_LEN, NONCE_LEN};

/// Fills `out` with the XSalsa20 keystream for `nonce` and `key`.
pub fn stream(out: &mut [u8], nonce: &[u8; NONCE_LEN], key: &[u8; KEY_LEN]) {
    out.fill(0);
    xor_ic(out, nonce, 0, key);
}

/// XORs `in_out` with the XSalsa20 keystream for `nonce` and `key`, starting at block `ic`.
///
/// The first 16 bytes of the nonce and the key derive a sub-key with HSalsa20; the last 8 bytes
/// of the nonce are the Salsa20 nonce under that sub-key.
pub fn xor_ic(in_out: &mut [u8], nonce: &[u8; NONCE_LEN], ic: u64, key: &[u8; KEY_LEN]) {
    let (mut subkey, n) = subkey(nonce, key);
    salsa20::xor_ic(in_out, &n, ic, &subkey);
    subkey.zeroize();
}

/// Encrypts or decrypts `message` with the raw XSalsa20 keystream. Provides no authentication.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyLength`] or [`Error::InvalidNonceLength`] if `key` or `nonce` are
/// the wrong length.
pub fn stream_xor(message: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>, Error> {
    let key: &[u8; KEY_LEN] = key.try_into().map_err(|_| Error::InvalidKeyLength(key.len()))?;
    let nonce: &[u8; NONCE_LEN] =
        nonce.try_into().map_err(|_| Error::InvalidNonceLength(nonce.len()))?;

    let mut out = message.to_vec();
    xor_ic(&mut out, nonce, 0, key);
    Ok(out)
}

/// Splits a 24-byte nonce into an HSalsa20 sub-key and the trailing 8-byte Salsa20 nonce.
pub(crate) fn subkey(
    nonce: &[u8; NONCE_LEN],
    key: &[u8; KEY_LEN],
) -> ([u8; KEY_LEN], [u8; salsa20::NONCE_LEN]) {
    let mut prefix = [0u8; salsa20::INPUT_LEN];
    prefix.copy_from_slice(&nonce[..salsa20::INPUT_LEN]);
    let mut n = [0u8; salsa20::NONCE_LEN];
    n.copy_from_slice(&nonce[salsa20::INPUT_LEN..]);
    (salsa20::hsalsa20(&prefix, key, SIGMA), n)
}
