//! Recoverable secp256k1 ECDSA.
//!
//! Reports are signed over their 32-byte digest with recoverable ECDSA. The
//! verifier never receives public keys: it recovers the signer's public key
//! from `(r, s, v)` and derives the signer [`Address`] from it, then checks
//! that address against the signer registry.
//!
//! The recovery id `v` is accepted both raw (`0`/`1`) and with the legacy
//! offset of 27 (`27`/`28`); it is normalized before the curve computation.
//! Only canonical low-s signatures are accepted.
//!
//! This module wraps the `secp256k1` crate with feed-specific types.

use ::secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use ::secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::blake3::contexts;
use crate::{Address, CryptoError, Result, ADDRESS_LEN};

/// Offset some signers add to the recovery id.
pub const RECOVERY_ID_OFFSET: u8 = 27;

/// Length of a serialized `r || s || v` signature.
pub const SIGNATURE_LEN: usize = 65;

/// A recoverable ECDSA signature as carried in a signature set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Big-endian `r` scalar.
    pub r: [u8; 32],
    /// Big-endian `s` scalar.
    pub s: [u8; 32],
    /// Recovery id, either `{0, 1}` or `{27, 28}`.
    pub v: u8,
}

impl Signature {
    /// Create a signature from `r || s || v` bytes.
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LEN]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Self { r, s, v: bytes[64] }
    }

    /// Serialize as `r || s || v`.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    fn compact(&self) -> [u8; 64] {
        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&self.r);
        compact[32..].copy_from_slice(&self.s);
        compact
    }
}

/// A secp256k1 signing key held by an oracle.
pub struct SigningKey {
    inner: SecretKey,
}

impl Clone for SigningKey {
    fn clone(&self) -> Self {
        Self { inner: self.inner }
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.inner.non_secure_erase();
    }
}

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            inner: SecretKey::new(&mut csprng),
        }
    }

    /// Create a signing key from a 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let inner =
            SecretKey::from_slice(bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Get the raw bytes of this signing key.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.inner.secret_bytes())
    }

    /// The address this key signs as.
    pub fn address(&self) -> Address {
        derive_address(&PublicKey::from_secret_key_global(&self.inner))
    }

    /// Sign a 32-byte report digest.
    ///
    /// The returned signature is low-s and carries `v` with the 27 offset.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Signature {
        let message = Message::from_digest(*digest);
        let signature = SECP256K1.sign_ecdsa_recoverable(&message, &self.inner);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        Signature {
            r,
            s,
            v: RECOVERY_ID_OFFSET + recovery_id.to_i32() as u8,
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("address", &hex::encode(self.address()))
            .finish()
    }
}

/// Normalize a recovery id to `{0, 1}`.
///
/// # Errors
///
/// [`CryptoError::InvalidSignature`] for any value other than 0, 1, 27, or 28.
pub fn normalize_recovery_id(v: u8) -> Result<u8> {
    match v {
        0 | 1 => Ok(v),
        27 | 28 => Ok(v - RECOVERY_ID_OFFSET),
        other => Err(CryptoError::InvalidSignature(format!(
            "invalid recovery id {other}"
        ))),
    }
}

/// Derive a signer address from a public key.
///
/// `address = BLAKE3::derive_key("OCR v1 signer-address", uncompressed[1..65])[12..32]`
pub fn derive_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = crate::blake3::derive_key(contexts::SIGNER_ADDRESS, &uncompressed[1..]);
    let mut address = [0u8; ADDRESS_LEN];
    address.copy_from_slice(&hash[32 - ADDRESS_LEN..]);
    address
}

/// Recover the address that produced `signature` over `digest`.
///
/// # Errors
///
/// [`CryptoError::InvalidSignature`] if the recovery id is invalid, `r` or
/// `s` is zero or not below the curve order, `s` is in the upper half of
/// the order, recovery fails, or the result is the null address.
pub fn recover(digest: &[u8; 32], signature: &Signature) -> Result<Address> {
    let v = normalize_recovery_id(signature.v)?;

    if signature.r == [0u8; 32] || signature.s == [0u8; 32] {
        return Err(CryptoError::InvalidSignature("zero r or s".to_string()));
    }

    let compact = signature.compact();

    // Reject malleable high-s encodings.
    let standard = ::secp256k1::ecdsa::Signature::from_compact(&compact)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let mut normalized = standard;
    normalized.normalize_s();
    if normalized != standard {
        return Err(CryptoError::InvalidSignature(
            "non-canonical s value".to_string(),
        ));
    }

    let recovery_id =
        RecoveryId::from_i32(i32::from(v)).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let message = Message::from_digest(*digest);
    let public_key = SECP256K1
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let address = derive_address(&public_key);
    if address == [0u8; ADDRESS_LEN] {
        return Err(CryptoError::InvalidSignature(
            "recovered null address".to_string(),
        ));
    }
    Ok(address)
}
