//! XSalsa20-Poly1305 authenticated symmetric encryption.

use std::fmt::{Debug, Formatter};

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{poly1305, salsa20, xsalsa20, Error, KEY_LEN, NONCE_LEN, TAG_LEN, ZERO_BYTES};

/// The byte layout of plaintexts and ciphertexts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// Ciphertexts are `tag || ciphertext`, 16 bytes longer than their plaintexts.
    #[default]
    Compact,

    /// The classic NaCl layout. Plaintexts carry 32 leading bytes, which are ignored when sealing
    /// and zeroed when opening; ciphertexts are 16 zero bytes, then the tag, then the ciphertext.
    /// Both are the same length.
    Padded,
}

impl WireFormat {
    /// The offset of the encrypted data in a ciphertext buffer, which is also the length of the
    /// prefix reserved in an in-place buffer.
    const fn offset(self) -> usize {
        match self {
            WireFormat::Compact => TAG_LEN,
            WireFormat::Padded => ZERO_BYTES,
        }
    }
}

/// A symmetric key for XSalsa20-Poly1305.
///
/// Each (key, nonce) pair must be used to seal at most one message.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBox {
    key: [u8; KEY_LEN],
    #[zeroize(skip)]
    format: WireFormat,
}

impl SecretBox {
    /// Creates a [`SecretBox`] with the given 32-byte key, using [`WireFormat::Compact`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyLength`] if `key` is not 32 bytes long.
    pub fn new(key: impl AsRef<[u8]>) -> Result<SecretBox, Error> {
        let key = key.as_ref();
        let key = <[u8; KEY_LEN]>::try_from(key).map_err(|_| Error::InvalidKeyLength(key.len()))?;
        Ok(SecretBox::from_key(key))
    }

    pub(crate) const fn from_key(key: [u8; KEY_LEN]) -> SecretBox {
        SecretBox { key, format: WireFormat::Compact }
    }

    /// Returns this key configured for the given wire format.
    #[must_use]
    pub fn with_format(mut self, format: WireFormat) -> SecretBox {
        self.format = format;
        self
    }

    /// The wire format used by this key.
    #[must_use]
    pub const fn format(&self) -> WireFormat {
        self.format
    }

    /// Encrypts and authenticates `plaintext` with the given 24-byte nonce.
    ///
    /// With [`WireFormat::Compact`] the result is `tag || ciphertext`. With
    /// [`WireFormat::Padded`] the plaintext must begin with 32 bytes of (ignored) padding and the
    /// result is 16 zero bytes, the tag, and the ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long, or
    /// [`Error::InvalidPlaintextLength`] if a padded plaintext is shorter than 32 bytes.
    pub fn seal(&self, plaintext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = match self.format {
            WireFormat::Compact => {
                let mut out = vec![0u8; TAG_LEN + plaintext.len()];
                out[TAG_LEN..].copy_from_slice(plaintext);
                out
            }
            WireFormat::Padded => plaintext.to_vec(),
        };
        self.seal_in_place(&mut out, nonce)?;
        Ok(out)
    }

    /// Verifies and decrypts `ciphertext` with the given 24-byte nonce.
    ///
    /// The tag is checked in constant time before any decryption happens. With
    /// [`WireFormat::Padded`] the result begins with 32 zero bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long,
    /// [`Error::InvalidCiphertextLength`] if `ciphertext` is too short to hold a tag, or
    /// [`Error::AuthenticationFailure`] if the ciphertext does not verify.
    pub fn open(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, Error> {
        let nonce = nonce_array(nonce)?;
        let offset = self.format.offset();
        if ciphertext.len() < offset {
            return Err(Error::InvalidCiphertextLength(ciphertext.len()));
        }

        let (prefix, data) = ciphertext.split_at(offset);
        let keystream = Keystream::new(&self.key, nonce);
        poly1305::verify(&tag_of(prefix), data, &keystream.otk)?;

        let (mut out, start) = match self.format {
            WireFormat::Compact => (data.to_vec(), 0),
            WireFormat::Padded => {
                let mut out = vec![0u8; ZERO_BYTES];
                out.extend_from_slice(data);
                (out, ZERO_BYTES)
            }
        };
        keystream.apply(&mut out[start..]);
        Ok(out)
    }

    /// Encrypts `in_out[offset..]` in place and writes the tag into the reserved prefix.
    ///
    /// The prefix is the first 16 bytes for [`WireFormat::Compact`] and the first 32 bytes for
    /// [`WireFormat::Padded`]; its contents are overwritten. On return `in_out` holds the
    /// ciphertext in this key's wire format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long, or
    /// [`Error::InvalidPlaintextLength`] if `in_out` is shorter than the prefix.
    pub fn seal_in_place(&self, in_out: &mut [u8], nonce: &[u8]) -> Result<(), Error> {
        let nonce = nonce_array(nonce)?;
        let offset = self.format.offset();
        if in_out.len() < offset {
            return Err(Error::InvalidPlaintextLength(in_out.len()));
        }

        let (prefix, data) = in_out.split_at_mut(offset);
        let keystream = Keystream::new(&self.key, nonce);
        keystream.apply(data);
        let tag = poly1305::authenticate(data, &keystream.otk);

        prefix.fill(0);
        prefix[offset - TAG_LEN..].copy_from_slice(&tag);
        Ok(())
    }

    /// Verifies and decrypts `in_out` in place, returning the plaintext as a slice of it.
    ///
    /// With [`WireFormat::Compact`] the plaintext is moved to the front of the buffer and the
    /// trailing 16 bytes are zeroed. With [`WireFormat::Padded`] the whole buffer is returned
    /// with its first 32 bytes zeroed. If verification fails, `in_out` is left unmodified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long,
    /// [`Error::InvalidCiphertextLength`] if `in_out` is too short to hold a tag, or
    /// [`Error::AuthenticationFailure`] if the ciphertext does not verify.
    pub fn open_in_place<'a>(&self, in_out: &'a mut [u8], nonce: &[u8]) -> Result<&'a [u8], Error> {
        let nonce = nonce_array(nonce)?;
        let offset = self.format.offset();
        if in_out.len() < offset {
            return Err(Error::InvalidCiphertextLength(in_out.len()));
        }

        let (prefix, data) = in_out.split_at_mut(offset);
        let keystream = Keystream::new(&self.key, nonce);
        poly1305::verify(&tag_of(prefix), data, &keystream.otk)?;
        keystream.apply(data);

        match self.format {
            WireFormat::Compact => {
                let len = in_out.len() - TAG_LEN;
                in_out.copy_within(TAG_LEN.., 0);
                in_out[len..].fill(0);
                Ok(&in_out[..len])
            }
            WireFormat::Padded => {
                in_out[..ZERO_BYTES].fill(0);
                Ok(&in_out[..])
            }
        }
    }
}

impl Debug for SecretBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBox").field("format", &self.format).finish_non_exhaustive()
    }
}

pub(crate) fn nonce_array(nonce: &[u8]) -> Result<&[u8; NONCE_LEN], Error> {
    nonce.try_into().map_err(|_| Error::InvalidNonceLength(nonce.len()))
}

fn tag_of(prefix: &[u8]) -> [u8; TAG_LEN] {
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&prefix[prefix.len() - TAG_LEN..]);
    tag
}

/// The XSalsa20 keystream for one (key, nonce) pair, split at the 32-byte one-time
/// authenticator key.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Keystream {
    subkey: [u8; KEY_LEN],
    nonce: [u8; salsa20::NONCE_LEN],
    otk: [u8; poly1305::KEY_LEN],
    head: [u8; salsa20::BLOCK_LEN - poly1305::KEY_LEN],
}

impl Keystream {
    fn new(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]) -> Keystream {
        let (subkey, nonce) = xsalsa20::subkey(nonce, key);

        let mut block = [0u8; salsa20::BLOCK_LEN];
        salsa20::xor_ic(&mut block, &nonce, 0, &subkey);

        let mut otk = [0u8; poly1305::KEY_LEN];
        otk.copy_from_slice(&block[..poly1305::KEY_LEN]);
        let mut head = [0u8; salsa20::BLOCK_LEN - poly1305::KEY_LEN];
        head.copy_from_slice(&block[poly1305::KEY_LEN..]);
        block.zeroize();

        Keystream { subkey, nonce, otk, head }
    }

    /// XORs `data` with the keystream from byte 32 onwards.
    fn apply(&self, data: &mut [u8]) {
        let (head, tail) = data.split_at_mut(data.len().min(self.head.len()));
        for (d, k) in head.iter_mut().zip(&self.head) {
            *d ^= k;
        }
        salsa20::xor_ic(tail, &self.nonce, 1, &self.subkey);
    }
}
