//! Oracle set configuration.
//!
//! A configuration fixes the fault threshold `f`, the signer set size, and
//! the configuration digest that every report must carry. A signer set of
//! `n >= 3f + 1` tolerates `f` faulty signers; a report needs `2f + 1`
//! signatures.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use ocr_crypto::blake3::{self, contexts};
use ocr_crypto::Address;
use ocr_types::{ConfigDigest, Observation, CONFIG_DIGEST_LEN, MAX_ORACLES};

use crate::{FeedError, Result};

/// Threshold and identity of the active oracle set.
///
/// Deserialization goes through the same checks as [`Configuration::new`]
/// and [`Configuration::with_answer_bounds`].
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfiguration")]
pub struct Configuration {
    signer_count: usize,
    f: u8,
    #[serde_as(as = "serde_with::hex::Hex")]
    config_digest: ConfigDigest,
    config_count: u64,
    min_answer: Observation,
    max_answer: Observation,
}

/// Unchecked wire form of [`Configuration`].
#[serde_as]
#[derive(Deserialize)]
struct RawConfiguration {
    signer_count: usize,
    f: u8,
    #[serde_as(as = "serde_with::hex::Hex")]
    config_digest: ConfigDigest,
    config_count: u64,
    min_answer: Observation,
    max_answer: Observation,
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = FeedError;

    fn try_from(raw: RawConfiguration) -> Result<Self> {
        Configuration::new(raw.signer_count, raw.f, raw.config_digest)?
            .with_config_count(raw.config_count)
            .with_answer_bounds(raw.min_answer, raw.max_answer)
    }
}

impl Configuration {
    /// Create a configuration with an externally supplied digest.
    ///
    /// The configuration count starts at 1 and answers are unbounded.
    ///
    /// # Errors
    ///
    /// [`FeedError::InvalidConfig`] if `signer_count < 3f + 1` or
    /// `signer_count > MAX_ORACLES`.
    pub fn new(signer_count: usize, f: u8, config_digest: ConfigDigest) -> Result<Self> {
        let min_signers = 3 * usize::from(f) + 1;
        if signer_count < min_signers {
            return Err(FeedError::InvalidConfig(format!(
                "{signer_count} signers cannot tolerate f = {f} (need at least {min_signers})"
            )));
        }
        if signer_count > MAX_ORACLES {
            return Err(FeedError::InvalidConfig(format!(
                "{signer_count} signers exceeds maximum of {MAX_ORACLES}"
            )));
        }

        Ok(Self {
            signer_count,
            f,
            config_digest,
            config_count: 1,
            min_answer: Observation::MIN,
            max_answer: Observation::MAX,
        })
    }

    /// Create a configuration whose digest is derived from the oracle set.
    ///
    /// See [`compute_config_digest`].
    pub fn derive(
        feed_id: &[u8; 32],
        config_count: u64,
        signers: &[Address],
        transmitters: &[Address],
        f: u8,
    ) -> Result<Self> {
        let digest = compute_config_digest(feed_id, config_count, signers, transmitters, f);
        Ok(Self::new(signers.len(), f, digest)?.with_config_count(config_count))
    }

    /// Set the configuration sequence number.
    pub fn with_config_count(mut self, config_count: u64) -> Self {
        self.config_count = config_count;
        self
    }

    /// Restrict accepted answers to `[min_answer, max_answer]`.
    ///
    /// # Errors
    ///
    /// [`FeedError::InvalidConfig`] if `min_answer > max_answer`.
    pub fn with_answer_bounds(
        mut self,
        min_answer: Observation,
        max_answer: Observation,
    ) -> Result<Self> {
        if min_answer > max_answer {
            return Err(FeedError::InvalidConfig(format!(
                "min answer {min_answer} exceeds max answer {max_answer}"
            )));
        }
        self.min_answer = min_answer;
        self.max_answer = max_answer;
        Ok(self)
    }

    pub fn signer_count(&self) -> usize {
        self.signer_count
    }

    /// Maximum number of faulty signers tolerated.
    pub fn f(&self) -> u8 {
        self.f
    }

    /// Signatures required for a report: `2f + 1`.
    pub fn quorum(&self) -> usize {
        2 * usize::from(self.f) + 1
    }

    pub fn config_digest(&self) -> ConfigDigest {
        self.config_digest
    }

    pub fn config_count(&self) -> u64 {
        self.config_count
    }

    /// Inclusive `(min, max)` answer bounds.
    pub fn answer_bounds(&self) -> (Observation, Observation) {
        (self.min_answer, self.max_answer)
    }
}

/// Derive a configuration digest.
///
/// `BLAKE3::derive_key("OCR v1 config-digest", fields)[..16]` over the
/// length-prefixed fields `feed_id`, `LE64(config_count)`, the concatenated
/// signers, the concatenated transmitters, and `f`.
pub fn compute_config_digest(
    feed_id: &[u8; 32],
    config_count: u64,
    signers: &[Address],
    transmitters: &[Address],
    f: u8,
) -> ConfigDigest {
    let signers = signers.concat();
    let transmitters = transmitters.concat();
    let count = config_count.to_le_bytes();
    let fields = blake3::encode_multi_field(&[
        &feed_id[..],
        &count[..],
        signers.as_slice(),
        transmitters.as_slice(),
        &[f][..],
    ]);
    let hash = blake3::derive_key(contexts::CONFIG_DIGEST, &fields);

    let mut digest = [0u8; CONFIG_DIGEST_LEN];
    digest.copy_from_slice(&hash[..CONFIG_DIGEST_LEN]);
    digest
}
