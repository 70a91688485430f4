//! Curve25519-XSalsa20-Poly1305 public-key authenticated encryption.

use zeroize::Zeroize;

use crate::salsa20::{hsalsa20, SIGMA};
use crate::scalarmult::scalarmult;
use crate::secretbox::{SecretBox, WireFormat};
use crate::{Error, PrivateKey, PublicKey, SharedKey};

/// Derives the symmetric key shared by `private_key` and `public_key`.
///
/// Runs one X25519 scalar multiplication, then hashes the result with HSalsa20 under an all-zero
/// input. The result is the same for both sides of the exchange and involves no randomness.
#[must_use]
pub fn precompute(private_key: &PrivateKey, public_key: &PublicKey) -> SharedKey {
    let mut s = scalarmult(private_key.as_bytes(), public_key.as_bytes());
    let k = hsalsa20(&[0u8; 16], &s, SIGMA);
    s.zeroize();
    SharedKey::new(k)
}

/// A box between one private key and one peer public key.
///
/// The expensive key agreement runs once at construction; every [`CryptoBox::encrypt`] and
/// [`CryptoBox::decrypt`] after that is a [`SecretBox`] operation under the shared key. A
/// `CryptoBox` is immutable and can be shared between threads.
#[derive(Clone, Debug)]
pub struct CryptoBox {
    inner: SecretBox,
}

impl CryptoBox {
    /// Creates a box from a private key and a peer's public key.
    #[must_use]
    pub fn new(private_key: &PrivateKey, public_key: &PublicKey) -> CryptoBox {
        CryptoBox::from_shared_key(&precompute(private_key, public_key))
    }

    /// Creates a box from a previously derived shared key.
    #[must_use]
    pub fn from_shared_key(shared_key: &SharedKey) -> CryptoBox {
        CryptoBox { inner: SecretBox::from_key(*shared_key.as_bytes()) }
    }

    /// Creates a box from raw 32-byte private and public keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyLength`] if either key is not 32 bytes long. No key agreement is
    /// attempted in that case.
    pub fn from_slices(
        private_key: impl AsRef<[u8]>,
        public_key: impl AsRef<[u8]>,
    ) -> Result<CryptoBox, Error> {
        let private_key = PrivateKey::from_bytes(private_key)?;
        let public_key = PublicKey::from_bytes(public_key)?;
        Ok(CryptoBox::new(&private_key, &public_key))
    }

    /// Creates a box from hex-encoded private and public keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if either string is not valid hex, or
    /// [`Error::InvalidKeyLength`] if either key does not decode to 32 bytes.
    pub fn from_hex(private_key: &str, public_key: &str) -> Result<CryptoBox, Error> {
        let private_key = private_key.parse::<PrivateKey>()?;
        let public_key = public_key.parse::<PublicKey>()?;
        Ok(CryptoBox::new(&private_key, &public_key))
    }

    /// Returns this box configured for the given wire format.
    #[must_use]
    pub fn with_format(self, format: WireFormat) -> CryptoBox {
        CryptoBox { inner: self.inner.with_format(format) }
    }

    /// The wire format used by this box.
    #[must_use]
    pub const fn format(&self) -> WireFormat {
        self.inner.format()
    }

    /// Encrypts and authenticates `plaintext` for the peer. See [`SecretBox::seal`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long, or
    /// [`Error::InvalidPlaintextLength`] if a padded plaintext is shorter than 32 bytes.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, Error> {
        self.inner.seal(plaintext, nonce)
    }

    /// Verifies and decrypts `ciphertext` from the peer. See [`SecretBox::open`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long,
    /// [`Error::InvalidCiphertextLength`] if `ciphertext` is too short to hold a tag, or
    /// [`Error::AuthenticationFailure`] if the ciphertext does not verify.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, Error> {
        self.inner.open(ciphertext, nonce)
    }

    /// Encrypts a buffer in place. See [`SecretBox::seal_in_place`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long, or
    /// [`Error::InvalidPlaintextLength`] if `in_out` is shorter than the reserved prefix.
    pub fn encrypt_in_place(&self, in_out: &mut [u8], nonce: &[u8]) -> Result<(), Error> {
        self.inner.seal_in_place(in_out, nonce)
    }

    /// Verifies and decrypts a buffer in place. See [`SecretBox::open_in_place`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long,
    /// [`Error::InvalidCiphertextLength`] if `in_out` is too short to hold a tag, or
    /// [`Error::AuthenticationFailure`] if the ciphertext does not verify.
    pub fn decrypt_in_place<'a>(
        &self,
        in_out: &'a mut [u8],
        nonce: &[u8],
    ) -> Result<&'a [u8], Error> {
        self.inner.open_in_place(in_out, nonce)
    }
}

/// Encrypts `plaintext` from `private_key` to `public_key` in one call, using the compact format.
///
/// Performs the full key agreement every time; use [`CryptoBox`] for more than one message.
///
/// # Errors
///
/// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long.
pub fn seal_box(
    plaintext: &[u8],
    nonce: &[u8],
    public_key: &PublicKey,
    private_key: &PrivateKey,
) -> Result<Vec<u8>, Error> {
    crate::secretbox::nonce_array(nonce)?;
    CryptoBox::new(private_key, public_key).encrypt(plaintext, nonce)
}

/// Verifies and decrypts `ciphertext` from `public_key` to `private_key` in one call, using the
/// compact format.
///
/// # Errors
///
/// Returns [`Error::InvalidNonceLength`] if `nonce` is not 24 bytes long,
/// [`Error::InvalidCiphertextLength`] if `ciphertext` is too short to hold a tag, or
/// [`Error::AuthenticationFailure`] if the ciphertext does not verify.
pub fn open_box(
    ciphertext: &[u8],
    nonce: &[u8],
    public_key: &PublicKey,
    private_key: &PrivateKey,
) -> Result<Vec<u8>, Error> {
    crate::secretbox::nonce_array(nonce)?;
    CryptoBox::new(private_key, public_key).decrypt(ciphertext, nonce)
}
