//! Report byte layout.
//!
//! The encoded report is exactly what signers hash and sign, so the layout
//! is fixed and decoding is strict: every byte string accepted by [`decode`]
//! re-encodes to itself.
//!
//! ```text
//! offset  size   field
//! 0       32     context word: 11 zero bytes | config digest (16) | epoch BE32 | round
//! 32      32     observers: byte i = observer index at position i, zero padded
//! 64      4      observation count n, BE32
//! 68      16*n   observations, each a big-endian two's-complement i128
//! ```

use serde::{Deserialize, Serialize};

use ocr_crypto::blake3::{self, contexts};
use ocr_types::{Observation, ReportContext, CONFIG_DIGEST_LEN, MAX_ORACLES};

use crate::{FeedError, Result};

/// Size of the context word.
pub const CONTEXT_LEN: usize = 32;

/// Size of the packed observer vector.
pub const OBSERVERS_LEN: usize = 32;

/// Size of the observation count prefix.
pub const COUNT_LEN: usize = 4;

/// Size of everything before the first observation.
pub const HEADER_LEN: usize = CONTEXT_LEN + OBSERVERS_LEN + COUNT_LEN;

/// Size of one encoded observation.
pub const OBSERVATION_LEN: usize = 16;

const CONTEXT_PADDING: usize = CONTEXT_LEN - CONFIG_DIGEST_LEN - 4 - 1;

/// A decoded report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub context: ReportContext,
    /// Observer index of each observation, in signature order.
    pub observers: Vec<u8>,
    /// Observations, aligned with `observers`.
    pub observations: Vec<Observation>,
}

impl Report {
    pub fn new(
        context: ReportContext,
        observers: Vec<u8>,
        observations: Vec<Observation>,
    ) -> Self {
        Self {
            context,
            observers,
            observations,
        }
    }

    /// Encode this report. See [`encode`].
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode(&self.context, &self.observers, &self.observations)
    }

    /// The digest signers sign. See [`digest`].
    pub fn digest(&self) -> Result<[u8; 32]> {
        digest(self)
    }
}

/// Encode a report.
///
/// # Errors
///
/// [`FeedError::MalformedReport`] if `observers` and `observations` differ in
/// length or hold more than [`MAX_ORACLES`] entries.
pub fn encode(
    context: &ReportContext,
    observers: &[u8],
    observations: &[Observation],
) -> Result<Vec<u8>> {
    if observers.len() != observations.len() {
        return Err(FeedError::MalformedReport(format!(
            "{} observers but {} observations",
            observers.len(),
            observations.len()
        )));
    }
    if observers.len() > MAX_ORACLES {
        return Err(FeedError::MalformedReport(format!(
            "{} observations exceeds maximum of {MAX_ORACLES}",
            observers.len()
        )));
    }

    let mut out = Vec::with_capacity(HEADER_LEN + observations.len() * OBSERVATION_LEN);

    out.extend_from_slice(&[0u8; CONTEXT_PADDING]);
    out.extend_from_slice(&context.config_digest);
    out.extend_from_slice(&context.epoch.to_be_bytes());
    out.push(context.round);

    let mut packed = [0u8; OBSERVERS_LEN];
    packed[..observers.len()].copy_from_slice(observers);
    out.extend_from_slice(&packed);

    out.extend_from_slice(&(observations.len() as u32).to_be_bytes());
    for observation in observations {
        out.extend_from_slice(&observation.to_be_bytes());
    }

    Ok(out)
}

/// Decode report bytes.
///
/// # Errors
///
/// [`FeedError::MalformedReport`] if the buffer is shorter than the header,
/// the context padding is non-zero, the observation count exceeds
/// [`MAX_ORACLES`], the total length does not match the count, or observer
/// bytes past the count are non-zero.
pub fn decode(bytes: &[u8]) -> Result<Report> {
    if bytes.len() < HEADER_LEN {
        return Err(FeedError::MalformedReport(format!(
            "report is {} bytes, header needs {HEADER_LEN}",
            bytes.len()
        )));
    }

    let (context_word, rest) = bytes.split_at(CONTEXT_LEN);
    let (observer_word, rest) = rest.split_at(OBSERVERS_LEN);
    let (count_word, body) = rest.split_at(COUNT_LEN);

    if context_word[..CONTEXT_PADDING].iter().any(|b| *b != 0) {
        return Err(FeedError::MalformedReport(
            "non-zero context padding".to_string(),
        ));
    }
    let mut config_digest = [0u8; CONFIG_DIGEST_LEN];
    config_digest.copy_from_slice(&context_word[CONTEXT_PADDING..CONTEXT_PADDING + CONFIG_DIGEST_LEN]);
    let mut epoch = [0u8; 4];
    epoch.copy_from_slice(&context_word[CONTEXT_PADDING + CONFIG_DIGEST_LEN..CONTEXT_LEN - 1]);
    let round = context_word[CONTEXT_LEN - 1];

    let mut count = [0u8; COUNT_LEN];
    count.copy_from_slice(count_word);
    let count = u32::from_be_bytes(count) as usize;
    if count > MAX_ORACLES {
        return Err(FeedError::MalformedReport(format!(
            "declared {count} observations, maximum is {MAX_ORACLES}"
        )));
    }

    let expected = count * OBSERVATION_LEN;
    if body.len() != expected {
        return Err(FeedError::MalformedReport(format!(
            "{} observation bytes inconsistent with {count} observations (expected {expected})",
            body.len()
        )));
    }

    if observer_word[count..].iter().any(|b| *b != 0) {
        return Err(FeedError::MalformedReport(format!(
            "observer vector has entries past the {count} declared observations"
        )));
    }
    let observers = observer_word[..count].to_vec();

    let observations = body
        .chunks_exact(OBSERVATION_LEN)
        .map(|chunk| {
            let mut word = [0u8; OBSERVATION_LEN];
            word.copy_from_slice(chunk);
            Observation::from_be_bytes(word)
        })
        .collect();

    Ok(Report {
        context: ReportContext::new(config_digest, u32::from_be_bytes(epoch), round),
        observers,
        observations,
    })
}

/// Hash of raw encoded report bytes.
///
/// `BLAKE3::derive_key("OCR v1 report-digest", bytes)`
pub fn digest_bytes(bytes: &[u8]) -> [u8; 32] {
    blake3::derive_key(contexts::REPORT_DIGEST, bytes)
}

/// The digest each signer signs: the hash of the encoded report.
pub fn digest(report: &Report) -> Result<[u8; 32]> {
    Ok(digest_bytes(&report.encode()?))
}
