//! NaCl's `crypto_box` and `crypto_secretbox`, built up from the field arithmetic.
//!
//! Two parties with X25519 key pairs agree on a shared key with [`precompute`] (or
//! [`CryptoBox::new`]), then encrypt and authenticate messages with XSalsa20-Poly1305 under
//! 24-byte nonces. Ciphertexts are byte-for-byte compatible with NaCl and libsodium.
//!
//! Two wire formats are supported, selected per key with [`WireFormat`]: the default
//! [`WireFormat::Compact`] (`tag || ciphertext`) and the classic zero-padded NaCl layout,
//! [`WireFormat::Padded`].
//!
//! A nonce must never be reused with the same key. Random 24-byte nonces are safe to use.
//!
//! ```rust
//! use naclbox::{CryptoBox, KeyPair, NONCE_LEN};
//! use rand::Rng;
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! // Alice generates a key pair.
//! let alice = KeyPair::random(rand::thread_rng());
//!
//! // Bea generates a key pair.
//! let bea = KeyPair::random(rand::thread_rng());
//!
//! // Alice encrypts a secret message for Bea.
//! let nonce = rand::thread_rng().gen::<[u8; NONCE_LEN]>();
//! let ciphertext = CryptoBox::new(&alice.private_key, &bea.public_key)
//!     .encrypt(b"this is a secret message", &nonce)?;
//!
//! // Bea decrypts the message.
//! let plaintext = CryptoBox::new(&bea.private_key, &alice.public_key)
//!     .decrypt(&ciphertext, &nonce)?;
//!
//! // Having decrypted the message, Bea can read the plaintext.
//! assert_eq!(b"this is a secret message".to_vec(), plaintext, "invalid plaintext");
//! #
//! #   Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use self::{
    crypto_box::*, encoding::*, errors::*, keys::*, secretbox::*, xsalsa20::stream_xor,
};

mod crypto_box;
mod encoding;
mod errors;
mod field;
mod keys;
pub mod poly1305;
pub mod salsa20;
pub mod scalarmult;
mod secretbox;
pub mod verify;
pub mod xsalsa20;

/// The length of a private key, in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// The length of a public key, in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// The length of a shared key derived by [`precompute`], in bytes.
pub const SHARED_KEY_LEN: usize = 32;

/// The length of a [`SecretBox`] key, in bytes.
pub const KEY_LEN: usize = 32;

/// The length of a nonce, in bytes.
pub const NONCE_LEN: usize = 24;

/// The length of a Poly1305 authentication tag, in bytes.
pub const TAG_LEN: usize = 16;

/// The number of bytes a [`WireFormat::Compact`] ciphertext adds to its plaintext.
pub const OVERHEAD: usize = TAG_LEN;

/// The number of leading bytes in a [`WireFormat::Padded`] plaintext.
pub const ZERO_BYTES: usize = 32;

/// The number of leading zero bytes in a [`WireFormat::Padded`] ciphertext.
pub const BOX_ZERO_BYTES: usize = ZERO_BYTES - TAG_LEN;

/// The length of an optional key generation seed, in bytes.
pub const SEED_LEN: usize = 32;
