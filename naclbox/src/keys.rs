use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;

use rand::{CryptoRng, Rng};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::scalarmult::scalarmult_base;
use crate::verify::verify_32;
use crate::{Error, PUBLIC_KEY_LEN, SECRET_KEY_LEN, SEED_LEN, SHARED_KEY_LEN};

/// A private key: a 32-byte X25519 scalar, clamped when used.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; SECRET_KEY_LEN]);

impl PrivateKey {
    /// Generates a random private key.
    #[must_use]
    pub fn random(mut rng: impl CryptoRng + Rng) -> PrivateKey {
        PrivateKey(rng.gen())
    }

    /// Creates a private key from 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyLength`] if `b` is not 32 bytes long.
    pub fn from_bytes(b: impl AsRef<[u8]>) -> Result<PrivateKey, Error> {
        let b = b.as_ref();
        <[u8; SECRET_KEY_LEN]>::try_from(b)
            .map(PrivateKey)
            .map_err(|_| Error::InvalidKeyLength(b.len()))
    }

    /// The raw, unclamped scalar.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }

    /// Returns the corresponding public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(scalarmult_base(&self.0))
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.public_key().fmt(f)
    }
}

impl Eq for PrivateKey {}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        verify_32(&self.0, &other.0)
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = hex::decode(s.trim())?;
        let key = PrivateKey::from_bytes(&b);
        b.zeroize();
        key
    }
}

/// A public key: the u-coordinate of an X25519 point.
///
/// Any 32 bytes are accepted; no validation of the point is performed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Creates a public key from 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyLength`] if `b` is not 32 bytes long.
    pub fn from_bytes(b: impl AsRef<[u8]>) -> Result<PublicKey, Error> {
        let b = b.as_ref();
        <[u8; PUBLIC_KEY_LEN]>::try_from(b)
            .map(PublicKey)
            .map_err(|_| Error::InvalidKeyLength(b.len()))
    }

    /// Encode the public key as a 32-byte array.
    #[must_use]
    pub const fn encode(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.0
    }

    /// The encoded public key.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicKey::from_bytes(hex::decode(s.trim())?)
    }
}

/// Derives the public key for the given 32-byte private scalar.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyLength`] if `private_key` is not 32 bytes long.
pub fn derive_public_key(private_key: impl AsRef<[u8]>) -> Result<PublicKey, Error> {
    Ok(PrivateKey::from_bytes(private_key)?.public_key())
}

/// A private key and its public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    /// The public key, always derived from `private_key`.
    pub public_key: PublicKey,

    /// The private key.
    pub private_key: PrivateKey,
}

impl KeyPair {
    /// Generates a random key pair.
    #[must_use]
    pub fn random(rng: impl CryptoRng + Rng) -> KeyPair {
        KeyPair::from(PrivateKey::random(rng))
    }

    /// Generates a key pair from 32 random bytes, XORed with `seed` if one is given.
    ///
    /// A seed does not replace the randomness: with a fixed seed the private key is still only as
    /// unpredictable as `rng`. Seeding with a deterministic RNG is useful for reproducible tests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSeedLength`] if `seed` is not 32 bytes long.
    pub fn generate(mut rng: impl CryptoRng + Rng, seed: Option<&[u8]>) -> Result<KeyPair, Error> {
        let seed = seed
            .map(|s| <&[u8; SEED_LEN]>::try_from(s).map_err(|_| Error::InvalidSeedLength(s.len())))
            .transpose()?;

        let mut d = PrivateKey(rng.gen());
        if let Some(seed) = seed {
            for (d, s) in d.0.iter_mut().zip(seed) {
                *d ^= s;
            }
        }
        Ok(KeyPair::from(d))
    }
}

impl From<PrivateKey> for KeyPair {
    fn from(private_key: PrivateKey) -> Self {
        KeyPair { public_key: private_key.public_key(), private_key }
    }
}

/// A 32-byte symmetric key shared between two key pairs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; SHARED_KEY_LEN]);

impl SharedKey {
    pub(crate) const fn new(k: [u8; SHARED_KEY_LEN]) -> SharedKey {
        SharedKey(k)
    }

    /// Creates a shared key from 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyLength`] if `b` is not 32 bytes long.
    pub fn from_bytes(b: impl AsRef<[u8]>) -> Result<SharedKey, Error> {
        let b = b.as_ref();
        <[u8; SHARED_KEY_LEN]>::try_from(b)
            .map(SharedKey)
            .map_err(|_| Error::InvalidKeyLength(b.len()))
    }

    /// The raw key.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SHARED_KEY_LEN] {
        &self.0
    }
}

impl Debug for SharedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKey").finish_non_exhaustive()
    }
}

impl Eq for SharedKey {}

impl PartialEq for SharedKey {
    fn eq(&self, other: &Self) -> bool {
        verify_32(&self.0, &other.0)
    }
}
