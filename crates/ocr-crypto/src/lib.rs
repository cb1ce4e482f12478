//! # ocr-crypto
//!
//! Cryptographic primitives for the OCR feed core.
//!
//! The suite is fixed: reports are hashed with domain-separated BLAKE3 and
//! signed with recoverable secp256k1 ECDSA. Signer identities are 20-byte
//! addresses derived from the recovered public key.
//!
//! ## Modules
//!
//! - [`blake3`]: Domain-separated BLAKE3 hashing (registered context strings)
//! - [`secp256k1`]: Recoverable ECDSA signing and signer recovery

pub mod blake3;
pub mod secp256k1;

/// Length in bytes of a signer address.
pub const ADDRESS_LEN: usize = 20;

/// A signer or transmitter address.
pub type Address = [u8; ADDRESS_LEN];

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The signature could not be recovered to a signer address.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Secret key bytes are not a valid secp256k1 scalar.
    #[error("invalid secret key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
