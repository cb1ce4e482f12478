//! Thread-safe feed handle.
//!
//! [`Feed`] owns the configuration, the signer registry, and the feed state
//! behind one lock. A submission holds the lock for the whole
//! verify-and-commit, so concurrent submissions are serialized and no
//! partially committed state is ever observable. Configuration changes take
//! the same lock.

use parking_lot::Mutex;

use ocr_crypto::secp256k1::Signature;
use ocr_crypto::Address;
use ocr_types::{Observation, Transmission, TransmissionDetails};

use crate::codec::{self, Report};
use crate::config::FeedConfig;
use crate::configuration::Configuration;
use crate::registry::SignerRegistry;
use crate::state::FeedState;
use crate::verifier::verify_and_commit;
use crate::{FeedError, Result};

struct Inner {
    config: Configuration,
    registry: SignerRegistry,
    state: FeedState,
}

/// Reject a registry whose signers do not match the configuration's
/// Byzantine bound.
fn check_registry(config: &Configuration, registry: &SignerRegistry) -> Result<()> {
    if registry.signer_count() != config.signer_count() {
        return Err(FeedError::InvalidConfig(format!(
            "registry has {} signers but the configuration expects {}",
            registry.signer_count(),
            config.signer_count()
        )));
    }
    if let Some((index, _)) = registry
        .signers()
        .into_iter()
        .find(|(index, _)| usize::from(*index) >= config.signer_count())
    {
        return Err(FeedError::InvalidConfig(format!(
            "signer index {index} is outside the {} configured signers",
            config.signer_count()
        )));
    }
    Ok(())
}

/// A single price feed.
pub struct Feed {
    description: String,
    decimals: u8,
    inner: Mutex<Inner>,
}

impl Feed {
    /// Create a feed with fresh state for `config`.
    ///
    /// # Errors
    ///
    /// [`FeedError::InvalidConfig`] if `registry` does not hold exactly the
    /// configured signers.
    pub fn new(
        description: impl Into<String>,
        decimals: u8,
        config: Configuration,
        registry: SignerRegistry,
    ) -> Result<Self> {
        check_registry(&config, &registry)?;
        let state = FeedState::new(&config);
        let description = description.into();
        tracing::info!(
            %description,
            digest = %hex::encode(config.config_digest()),
            f = config.f(),
            signers = config.signer_count(),
            "feed initialized"
        );
        Ok(Self {
            description,
            decimals,
            inner: Mutex::new(Inner {
                config,
                registry,
                state,
            }),
        })
    }

    /// Resume a feed from previously persisted state.
    ///
    /// # Errors
    ///
    /// [`FeedError::InvalidConfig`] if `state` belongs to a different
    /// configuration or `registry` does not match it.
    pub fn restore(
        description: impl Into<String>,
        decimals: u8,
        config: Configuration,
        registry: SignerRegistry,
        state: FeedState,
    ) -> Result<Self> {
        check_registry(&config, &registry)?;
        if state.active_config_digest() != config.config_digest()
            || state.config_count() != config.config_count()
        {
            return Err(FeedError::InvalidConfig(format!(
                "persisted state is for config {} (count {}), not {} (count {})",
                hex::encode(state.active_config_digest()),
                state.config_count(),
                hex::encode(config.config_digest()),
                config.config_count()
            )));
        }
        Ok(Self {
            description: description.into(),
            decimals,
            inner: Mutex::new(Inner {
                config,
                registry,
                state,
            }),
        })
    }

    /// Create a feed from a parsed configuration file.
    pub fn from_config(file: &FeedConfig) -> Result<Self> {
        let (config, registry) = file.build()?;
        Self::new(
            file.feed.description.clone(),
            file.feed.decimals,
            config,
            registry,
        )
    }

    /// Decode `report_bytes` and submit the report.
    ///
    /// # Errors
    ///
    /// [`FeedError::MalformedReport`] if the bytes do not decode, otherwise
    /// any error of [`verify_and_commit`].
    pub fn transmit(
        &self,
        submitter: &Address,
        report_bytes: &[u8],
        signatures: &[Signature],
    ) -> Result<Transmission> {
        let report = codec::decode(report_bytes)?;
        self.submit(submitter, &report, signatures)
    }

    /// Verify and commit a decoded report as one atomic step.
    pub fn submit(
        &self,
        submitter: &Address,
        report: &Report,
        signatures: &[Signature],
    ) -> Result<Transmission> {
        let mut inner = self.inner.lock();
        let Inner {
            config,
            registry,
            state,
        } = &mut *inner;
        verify_and_commit(submitter, report, signatures, config, registry, state)
    }

    /// Install a new configuration and signer registry.
    ///
    /// Sequencing restarts at `(0, 0)` under the new digest; reports for the
    /// old digest are rejected as stale from then on.
    ///
    /// # Errors
    ///
    /// [`FeedError::InvalidConfig`] if the configuration count does not
    /// increase, the digest was used before, or `registry` does not match
    /// the configured signers.
    pub fn set_config(&self, config: Configuration, registry: SignerRegistry) -> Result<()> {
        check_registry(&config, &registry)?;
        let mut inner = self.inner.lock();
        inner.state.apply_config(&config)?;
        tracing::info!(
            digest = %hex::encode(config.config_digest()),
            config_count = config.config_count(),
            f = config.f(),
            signers = config.signer_count(),
            "configuration changed"
        );
        inner.config = config;
        inner.registry = registry;
        Ok(())
    }

    pub fn latest_answer(&self) -> Observation {
        self.inner.lock().state.latest_answer()
    }

    pub fn latest_transmission_details(&self) -> TransmissionDetails {
        self.inner.lock().state.latest_transmission_details()
    }

    /// Copy of the current state, e.g. for persistence.
    pub fn state_snapshot(&self) -> FeedState {
        self.inner.lock().state.clone()
    }

    pub fn configuration(&self) -> Configuration {
        self.inner.lock().config.clone()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Implicit decimal places of every answer.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }
}
