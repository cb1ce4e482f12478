//! Feed state.
//!
//! The minimal durable state of a feed: the active configuration digest, the
//! last accepted `(epoch, round)`, and the latest answer. It is mutated only
//! by a successful verify-and-commit or by installing a new configuration;
//! every other access is read-only. Every digest the feed has ever run under
//! is remembered so that none of them can be installed again with a reset
//! sequence.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use ocr_types::{ConfigDigest, Observation, ReportContext, Transmission, TransmissionDetails};

use crate::configuration::Configuration;
use crate::{FeedError, Result};

/// Latest answer and sequencing state of one feed.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedState {
    #[serde_as(as = "serde_with::hex::Hex")]
    active_config_digest: ConfigDigest,
    config_count: u64,
    last_epoch: u32,
    last_round: u8,
    latest_answer: Observation,
    latest_round_id: u32,
    /// Digests of configurations that have been replaced.
    #[serde_as(as = "Vec<serde_with::hex::Hex>")]
    #[serde(default)]
    retired_config_digests: Vec<ConfigDigest>,
}

impl FeedState {
    /// Initial state for a feed running `config`: no answer, sequence `(0, 0)`.
    pub fn new(config: &Configuration) -> Self {
        Self {
            active_config_digest: config.config_digest(),
            config_count: config.config_count(),
            last_epoch: 0,
            last_round: 0,
            latest_answer: 0,
            latest_round_id: 0,
            retired_config_digests: Vec::new(),
        }
    }

    pub fn latest_answer(&self) -> Observation {
        self.latest_answer
    }

    pub fn last_epoch(&self) -> u32 {
        self.last_epoch
    }

    pub fn last_round(&self) -> u8 {
        self.last_round
    }

    pub fn active_config_digest(&self) -> ConfigDigest {
        self.active_config_digest
    }

    pub fn config_count(&self) -> u64 {
        self.config_count
    }

    /// Number of reports committed so far.
    pub fn latest_round_id(&self) -> u32 {
        self.latest_round_id
    }

    /// Whether the feed has ever run under `digest`.
    pub fn has_used_digest(&self, digest: &ConfigDigest) -> bool {
        self.active_config_digest == *digest || self.retired_config_digests.contains(digest)
    }

    pub fn latest_transmission_details(&self) -> TransmissionDetails {
        TransmissionDetails {
            config_digest: self.active_config_digest,
            epoch: self.last_epoch,
            round: self.last_round,
            latest_answer: self.latest_answer,
            round_id: self.latest_round_id,
        }
    }

    /// Record an accepted report.
    pub(crate) fn commit(&mut self, context: &ReportContext, answer: Observation) -> Transmission {
        self.latest_answer = answer;
        self.last_epoch = context.epoch;
        self.last_round = context.round;
        self.latest_round_id = self.latest_round_id.saturating_add(1);

        Transmission {
            answer,
            epoch: context.epoch,
            round: context.round,
            round_id: self.latest_round_id,
        }
    }

    /// Switch to a new configuration and restart sequencing at `(0, 0)`.
    ///
    /// The latest answer and round id carry over.
    ///
    /// # Errors
    ///
    /// [`FeedError::InvalidConfig`] unless the configuration count strictly
    /// increases and the digest has never been used by this feed. Reports
    /// signed under an earlier digest therefore stay rejected for good.
    pub(crate) fn apply_config(&mut self, config: &Configuration) -> Result<()> {
        if config.config_count() <= self.config_count {
            return Err(FeedError::InvalidConfig(format!(
                "config count {} does not advance past {}",
                config.config_count(),
                self.config_count
            )));
        }
        if self.has_used_digest(&config.config_digest()) {
            return Err(FeedError::InvalidConfig(format!(
                "config digest {} was already used by this feed",
                hex::encode(config.config_digest())
            )));
        }

        self.retired_config_digests.push(self.active_config_digest);
        self.active_config_digest = config.config_digest();
        self.config_count = config.config_count();
        self.last_epoch = 0;
        self.last_round = 0;
        Ok(())
    }
}
