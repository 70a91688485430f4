use thiserror::Error;

/// The error type for all fallible operations.
///
/// Every variant except [`Error::AuthenticationFailure`] depends only on the lengths or encodings
/// of public inputs and is safe to branch on.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum Error {
    /// A private, public, or symmetric key was not 32 bytes long.
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// A nonce was not 24 bytes long.
    #[error("invalid nonce length: expected 24 bytes, got {0}")]
    InvalidNonceLength(usize),

    /// A key generation seed was not 32 bytes long.
    #[error("invalid seed length: expected 32 bytes, got {0}")]
    InvalidSeedLength(usize),

    /// A ciphertext was too short to contain an authentication tag.
    #[error("invalid ciphertext length: {0} bytes is shorter than the overhead")]
    InvalidCiphertextLength(usize),

    /// A plaintext buffer was too short to hold its leading zero bytes or reserved tag space.
    #[error("invalid plaintext length: {0} bytes is shorter than the required prefix")]
    InvalidPlaintextLength(usize),

    /// The ciphertext failed authentication.
    ///
    /// The ciphertext may have been altered, the nonce may be wrong, or the message may not have
    /// been encrypted with the given key.
    #[error("ciphertext fails verification")]
    AuthenticationFailure,

    /// A hex-encoded key or nonce was malformed.
    #[error("invalid hex encoding: {0}")]
    InvalidEncoding(#[from] hex::FromHexError),
}
