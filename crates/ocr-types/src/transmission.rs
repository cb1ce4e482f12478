//! Results of accepted reports.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{ConfigDigest, Observation};

/// Outcome of a committed report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    /// The new aggregate answer.
    pub answer: Observation,
    pub epoch: u32,
    pub round: u8,
    /// Aggregator round id, incremented on every commit.
    pub round_id: u32,
}

/// Snapshot of the latest committed transmission.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionDetails {
    #[serde_as(as = "serde_with::hex::Hex")]
    pub config_digest: ConfigDigest,
    pub epoch: u32,
    pub round: u8,
    pub latest_answer: Observation,
    pub round_id: u32,
}
