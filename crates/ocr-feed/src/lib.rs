//! # ocr-feed
//!
//! Verification and aggregation core of an Off-Chain Reporting price feed.
//!
//! A transmitter submits a report (configuration digest, epoch, round, the
//! participating observer indices, and their observations) together with
//! `2f + 1` recoverable signatures. The report is accepted only if every
//! signature recovers to the registered signer for the claimed observer
//! index, the observers are distinct, and the `(epoch, round)` pair is newer
//! than anything accepted before. The feed answer becomes the median
//! observation.
//!
//! ## Modules
//!
//! - [`codec`]: Report byte layout, decoding, and the signed digest
//! - [`registry`]: Signer/transmitter roles and observer indices
//! - [`configuration`]: Threshold `f`, quorum size, and configuration digest
//! - [`verifier`]: The verify-and-commit pipeline
//! - [`median`]: Median aggregation
//! - [`state`]: Latest answer and sequencing state
//! - [`feed`]: Thread-safe feed handle that serializes submissions
//! - [`config`]: TOML feed configuration file

pub mod codec;
pub mod config;
pub mod configuration;
pub mod feed;
pub mod median;
pub mod registry;
pub mod state;
pub mod verifier;

pub use codec::Report;
pub use configuration::Configuration;
pub use feed::Feed;
pub use registry::{Role, SignerEntry, SignerRegistry};
pub use state::FeedState;
pub use verifier::verify_and_commit;

use ocr_crypto::Address;
use ocr_types::{ConfigDigest, Observation};

/// Error types for feed operations.
///
/// Every variant is a rejection: the feed state is never modified when an
/// operation returns an error.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The submitter is not a registered transmitter.
    #[error("unauthorized transmitter {}", hex::encode(.submitter))]
    Unauthorized {
        /// The submitting address.
        submitter: Address,
    },

    /// The report targets a configuration other than the active one.
    #[error(
        "stale config digest: report has {}, active is {}",
        hex::encode(.actual),
        hex::encode(.expected)
    )]
    StaleConfig {
        /// The active configuration digest.
        expected: ConfigDigest,
        /// The digest carried by the report.
        actual: ConfigDigest,
    },

    /// The report's `(epoch, round)` is not newer than the last accepted one.
    #[error("stale report: ({epoch}, {round}) <= last accepted ({last_epoch}, {last_round})")]
    StaleReport {
        /// Epoch of the rejected report.
        epoch: u32,
        /// Round of the rejected report.
        round: u8,
        /// Last accepted epoch.
        last_epoch: u32,
        /// Last accepted round.
        last_round: u8,
    },

    /// Signature or observer count differs from `2f + 1`.
    #[error("quorum mismatch: need {required}, have {signatures} signatures and {observers} observers")]
    QuorumMismatch {
        /// Required quorum `2f + 1`.
        required: usize,
        /// Number of signatures supplied.
        signatures: usize,
        /// Number of observers in the report.
        observers: usize,
    },

    /// Report bytes could not be decoded or are internally inconsistent.
    #[error("malformed report: {0}")]
    MalformedReport(String),

    /// A signature could not be recovered to a signer address.
    #[error("invalid signature at position {index}: {reason}")]
    InvalidSignature {
        /// Position of the signature in the signature set.
        index: usize,
        /// Why recovery failed.
        reason: String,
    },

    /// A recovered signer is not authorized for the claimed observer index.
    #[error("invalid signer {} at position {index}: {reason}", hex::encode(.signer))]
    InvalidSigner {
        /// Position of the signature in the signature set.
        index: usize,
        /// The recovered address.
        signer: Address,
        /// Why the signer was rejected.
        reason: String,
    },

    /// The same observer index appears more than once in a report.
    #[error("duplicate signer for observer index {observer}")]
    DuplicateSigner {
        /// The repeated observer index.
        observer: u8,
    },

    /// Address has no role in the registry.
    #[error("unknown signer {}", hex::encode(.signer))]
    UnknownSigner {
        /// The address looked up.
        signer: Address,
    },

    /// A signer index is already held by another address.
    #[error("signer index {index} already held by {}", hex::encode(.holder))]
    IndexInUse {
        /// The contested index.
        index: u8,
        /// The address currently holding it.
        holder: Address,
    },

    /// The median falls outside the configured answer bounds.
    #[error("answer {answer} outside bounds [{min}, {max}]")]
    AnswerOutOfRange {
        /// The computed median.
        answer: Observation,
        /// Lower bound (inclusive).
        min: Observation,
        /// Upper bound (inclusive).
        max: Observation,
    },

    /// Configuration parameters violate an invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The feed configuration file could not be read or parsed.
    #[error("config file error: {0}")]
    Config(String),
}

/// Convenience result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
