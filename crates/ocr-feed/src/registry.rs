//! Signer registry.
//!
//! Maps addresses to an oracle index and a role. Signers are the keys whose
//! signatures count toward quorum; transmitters are the addresses allowed to
//! submit reports. An address holds at most one role.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use ocr_crypto::Address;
use ocr_types::MAX_ORACLES;

use crate::{FeedError, Result};

/// Role of an address in the active configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Unset,
    Signer,
    Transmitter,
}

/// Registry entry for an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerEntry {
    /// Oracle index within the configuration.
    pub index: u8,
    pub role: Role,
}

/// Address → (index, role) mapping for one configuration.
#[derive(Clone, Debug, Default)]
pub struct SignerRegistry {
    entries: HashMap<Address, SignerEntry>,
}

impl SignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry where each signer and transmitter gets the index of
    /// its position in the list.
    ///
    /// # Errors
    ///
    /// [`FeedError::InvalidConfig`] if either list exceeds [`MAX_ORACLES`] or
    /// an address appears twice across both lists.
    pub fn from_oracles(signers: &[Address], transmitters: &[Address]) -> Result<Self> {
        if signers.len() > MAX_ORACLES || transmitters.len() > MAX_ORACLES {
            return Err(FeedError::InvalidConfig(format!(
                "{} signers / {} transmitters exceeds maximum of {MAX_ORACLES}",
                signers.len(),
                transmitters.len()
            )));
        }

        let mut seen = HashSet::new();
        for address in signers.iter().chain(transmitters) {
            if !seen.insert(*address) {
                return Err(FeedError::InvalidConfig(format!(
                    "repeated oracle address {}",
                    hex::encode(address)
                )));
            }
        }

        let mut registry = Self::new();
        for (index, address) in signers.iter().enumerate() {
            registry.assign(*address, index as u8, Role::Signer)?;
        }
        for (index, address) in transmitters.iter().enumerate() {
            registry.assign(*address, index as u8, Role::Transmitter)?;
        }
        Ok(registry)
    }

    /// Look up the entry for `identity`.
    ///
    /// # Errors
    ///
    /// [`FeedError::UnknownSigner`] if the address has no role.
    pub fn lookup(&self, identity: &Address) -> Result<SignerEntry> {
        match self.entries.get(identity) {
            Some(entry) if entry.role != Role::Unset => Ok(*entry),
            _ => Err(FeedError::UnknownSigner { signer: *identity }),
        }
    }

    /// Insert or overwrite the entry for `identity`. Assigning
    /// [`Role::Unset`] removes it.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidConfig`] if `index >= MAX_ORACLES`
    /// - [`FeedError::IndexInUse`] if another address already signs at `index`
    pub fn assign(&mut self, identity: Address, index: u8, role: Role) -> Result<()> {
        if usize::from(index) >= MAX_ORACLES {
            return Err(FeedError::InvalidConfig(format!(
                "oracle index {index} out of range (max {})",
                MAX_ORACLES - 1
            )));
        }

        if role == Role::Unset {
            self.entries.remove(&identity);
            return Ok(());
        }

        if role == Role::Signer {
            let holder = self.entries.iter().find(|(address, entry)| {
                **address != identity && entry.role == Role::Signer && entry.index == index
            });
            if let Some((holder, _)) = holder {
                return Err(FeedError::IndexInUse {
                    index,
                    holder: *holder,
                });
            }
        }

        tracing::debug!(
            address = %hex::encode(identity),
            index,
            ?role,
            "assigned oracle"
        );
        self.entries.insert(identity, SignerEntry { index, role });
        Ok(())
    }

    /// Addresses allowed to submit reports.
    pub fn transmitters(&self) -> BTreeSet<Address> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.role == Role::Transmitter)
            .map(|(address, _)| *address)
            .collect()
    }

    /// Whether `identity` may submit reports.
    pub fn is_transmitter(&self, identity: &Address) -> bool {
        matches!(
            self.entries.get(identity),
            Some(SignerEntry {
                role: Role::Transmitter,
                ..
            })
        )
    }

    /// Signer addresses ordered by index.
    pub fn signers(&self) -> Vec<(u8, Address)> {
        let mut signers: Vec<(u8, Address)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.role == Role::Signer)
            .map(|(address, entry)| (entry.index, *address))
            .collect();
        signers.sort();
        signers
    }

    /// Number of registered signers.
    pub fn signer_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.role == Role::Signer)
            .count()
    }
}
