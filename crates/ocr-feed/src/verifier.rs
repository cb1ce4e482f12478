//! Verify-and-commit pipeline.
//!
//! [`verify_and_commit`] runs every check against a report before touching
//! the feed state, in this order:
//!
//! 1. the submitter is a registered transmitter
//! 2. the report targets the active configuration digest
//! 3. `(epoch, round)` is strictly newer than the last accepted pair
//! 4. signature and observer counts both equal `2f + 1`
//! 5. the report digest is recomputed from its encoding
//! 6. each signature recovers to the signer registered at the claimed
//!    observer index
//! 7. observer indices are pairwise distinct
//! 8. the median lies within the configured answer bounds
//!
//! The first failing check aborts the call; state is only written in the
//! final commit step.
//!
//! Each check is also exposed as a standalone function so it can be tested
//! and reused on its own.

use ocr_crypto::secp256k1::{self, Signature};
use ocr_crypto::Address;
use ocr_types::{Observation, Transmission};

use crate::codec::{self, Report};
use crate::configuration::Configuration;
use crate::median::median;
use crate::registry::{Role, SignerRegistry};
use crate::state::FeedState;
use crate::{FeedError, Result};

/// Verify a signed report and, if every check passes, commit its median.
///
/// # Errors
///
/// - [`FeedError::Unauthorized`] if `submitter` is not a transmitter
/// - [`FeedError::StaleConfig`] if the report targets another configuration
/// - [`FeedError::StaleReport`] if `(epoch, round)` is not newer than the last commit
/// - [`FeedError::QuorumMismatch`] if counts differ from `2f + 1`
/// - [`FeedError::MalformedReport`] if the report cannot be encoded
/// - [`FeedError::InvalidSignature`] if a signature does not recover
/// - [`FeedError::InvalidSigner`] if a recovered signer is not the registered
///   signer for its observer index
/// - [`FeedError::DuplicateSigner`] if an observer index repeats
/// - [`FeedError::AnswerOutOfRange`] if the median is outside the bounds
pub fn verify_and_commit(
    submitter: &Address,
    report: &Report,
    signatures: &[Signature],
    config: &Configuration,
    registry: &SignerRegistry,
    state: &mut FeedState,
) -> Result<Transmission> {
    let answer = verify(submitter, report, signatures, config, registry, state)
        .inspect_err(|e| {
            tracing::warn!(
                submitter = %hex::encode(submitter),
                epoch = report.context.epoch,
                round = report.context.round,
                error = %e,
                "rejected report"
            );
        })?;

    let transmission = state.commit(&report.context, answer);
    tracing::info!(
        answer,
        epoch = transmission.epoch,
        round = transmission.round,
        round_id = transmission.round_id,
        "committed report"
    );
    Ok(transmission)
}

/// Run every check without committing. Returns the median on success.
fn verify(
    submitter: &Address,
    report: &Report,
    signatures: &[Signature],
    config: &Configuration,
    registry: &SignerRegistry,
    state: &FeedState,
) -> Result<Observation> {
    check_transmitter(submitter, registry)?;
    check_context(report, state)?;
    check_quorum(report, signatures, config)?;

    let digest = codec::digest(report)?;

    for (index, (signature, observer)) in signatures.iter().zip(&report.observers).enumerate() {
        authenticate_signer(index, &digest, signature, *observer, registry)?;
    }
    tracing::debug!(signatures = signatures.len(), "signatures verified");

    check_unique_observers(&report.observers)?;

    let answer = median(&report.observations).ok_or_else(|| {
        FeedError::MalformedReport("report carries no observations".to_string())
    })?;
    check_answer_bounds(answer, config)?;
    Ok(answer)
}

/// The submitter must hold the transmitter role.
pub fn check_transmitter(submitter: &Address, registry: &SignerRegistry) -> Result<()> {
    if registry.is_transmitter(submitter) {
        Ok(())
    } else {
        Err(FeedError::Unauthorized {
            submitter: *submitter,
        })
    }
}

/// The report must target the active digest and be strictly newer than the
/// last accepted `(epoch, round)`.
pub fn check_context(report: &Report, state: &FeedState) -> Result<()> {
    let context = &report.context;
    if context.config_digest != state.active_config_digest() {
        return Err(FeedError::StaleConfig {
            expected: state.active_config_digest(),
            actual: context.config_digest,
        });
    }
    if !context.is_after(state.last_epoch(), state.last_round()) {
        return Err(FeedError::StaleReport {
            epoch: context.epoch,
            round: context.round,
            last_epoch: state.last_epoch(),
            last_round: state.last_round(),
        });
    }
    Ok(())
}

/// Signature and observer counts must both equal `2f + 1`.
pub fn check_quorum(report: &Report, signatures: &[Signature], config: &Configuration) -> Result<()> {
    let required = config.quorum();
    if signatures.len() != required || report.observers.len() != required {
        return Err(FeedError::QuorumMismatch {
            required,
            signatures: signatures.len(),
            observers: report.observers.len(),
        });
    }
    Ok(())
}

/// Recover the signer of `signature` and bind it to `observer`.
///
/// `index` is the position of the signature in the set and is only used
/// for error reporting. Returns the recovered address.
pub fn authenticate_signer(
    index: usize,
    digest: &[u8; 32],
    signature: &Signature,
    observer: u8,
    registry: &SignerRegistry,
) -> Result<Address> {
    let signer = secp256k1::recover(digest, signature).map_err(|e| FeedError::InvalidSignature {
        index,
        reason: e.to_string(),
    })?;

    let entry = registry
        .lookup(&signer)
        .map_err(|_| FeedError::InvalidSigner {
            index,
            signer,
            reason: "not registered".to_string(),
        })?;

    if entry.role != Role::Signer {
        return Err(FeedError::InvalidSigner {
            index,
            signer,
            reason: format!("role is {:?}, not Signer", entry.role),
        });
    }
    if entry.index != observer {
        return Err(FeedError::InvalidSigner {
            index,
            signer,
            reason: format!(
                "claimed observer index {observer}, registered index {}",
                entry.index
            ),
        });
    }
    Ok(signer)
}

/// Observer indices must be pairwise distinct.
pub fn check_unique_observers(observers: &[u8]) -> Result<()> {
    let mut seen = [false; 256];
    for observer in observers {
        let slot = &mut seen[usize::from(*observer)];
        if *slot {
            return Err(FeedError::DuplicateSigner {
                observer: *observer,
            });
        }
        *slot = true;
    }
    Ok(())
}

/// The answer must lie within the configured inclusive bounds.
pub fn check_answer_bounds(answer: Observation, config: &Configuration) -> Result<()> {
    let (min, max) = config.answer_bounds();
    if answer < min || answer > max {
        return Err(FeedError::AnswerOutOfRange { answer, min, max });
    }
    Ok(())
}
