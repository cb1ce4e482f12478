//! Integration tests for the OCR feed core.
//!
//! The library only holds fixtures shared by the scenarios under `tests/`:
//! deterministic oracle sets, feed construction, and report signing.
//!
//! ```sh
//! cargo test -p ocr-integration-tests
//! ```

use ocr_crypto::secp256k1::{Signature, SigningKey};
use ocr_crypto::Address;
use ocr_feed::{Configuration, Feed, Report, Result, SignerRegistry};
use ocr_types::{Observation, ReportContext};

/// Feed identifier used by every fixture.
pub const FEED_ID: [u8; 32] = [0x0f; 32];

/// One oracle set: signing keys by observer index plus transmitters.
pub struct OracleSet {
    pub keys: Vec<SigningKey>,
    pub transmitters: Vec<Address>,
    pub f: u8,
}

impl OracleSet {
    /// `n` signers with secret keys `[seed + i; 32]` and one transmitter.
    pub fn new(n: usize, f: u8, seed: u8) -> Result<Self> {
        let keys = (0..n)
            .map(|i| {
                let byte = seed.wrapping_add(i as u8);
                SigningKey::from_bytes(&[byte; 32])
                    .map_err(|e| ocr_feed::FeedError::InvalidConfig(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            keys,
            transmitters: vec![[0xee; 20]],
            f,
        })
    }

    pub fn transmitter(&self) -> Address {
        self.transmitters[0]
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.keys.iter().map(SigningKey::address).collect()
    }

    /// Configuration and registry for this set at `config_count`.
    pub fn configure(&self, config_count: u64) -> Result<(Configuration, SignerRegistry)> {
        let signers = self.addresses();
        let config =
            Configuration::derive(&FEED_ID, config_count, &signers, &self.transmitters, self.f)?;
        let registry = SignerRegistry::from_oracles(&signers, &self.transmitters)?;
        Ok((config, registry))
    }

    /// A fresh feed running this set at configuration count 1.
    pub fn feed(&self) -> Result<Feed> {
        let (config, registry) = self.configure(1)?;
        Feed::new("integration feed", 8, config, registry)
    }

    /// Sign `report` with the key of each of its observers, in order.
    ///
    /// Observers without a key in this set are skipped, which yields a short
    /// signature set.
    pub fn sign(&self, report: &Report) -> Result<Vec<Signature>> {
        let digest = report.digest()?;
        Ok(report
            .observers
            .iter()
            .filter_map(|&i| self.keys.get(usize::from(i)))
            .map(|key| key.sign_digest(&digest))
            .collect())
    }
}

/// Report for `feed`'s active configuration at `(epoch, round)`.
pub fn report_for(
    feed: &Feed,
    epoch: u32,
    round: u8,
    observers: Vec<u8>,
    observations: Vec<Observation>,
) -> Report {
    let digest = feed.configuration().config_digest();
    Report::new(
        ReportContext::new(digest, epoch, round),
        observers,
        observations,
    )
}

/// The first `2f + 1` observer indices.
pub fn quorum_observers(f: u8) -> Vec<u8> {
    (0..=2 * f).collect()
}
