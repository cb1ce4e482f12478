//! Feed configuration file.
//!
//! A feed is described by a TOML file with a `[feed]` and an `[oracles]`
//! table:
//!
//! ```toml
//! [feed]
//! description = "ETH / USD"
//! decimals = 8
//! feed_id = "0x…32 bytes hex…"
//! min_answer = "1"
//! max_answer = "100000000000000"
//!
//! [oracles]
//! f = 1
//! config_count = 1
//! signers = ["0x…", "0x…", "0x…", "0x…"]
//! transmitters = ["0x…"]
//! ```
//!
//! Answer bounds are decimal strings since TOML integers are 64-bit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ocr_crypto::{Address, ADDRESS_LEN};
use ocr_types::{Observation, DEFAULT_DECIMALS};

use crate::configuration::Configuration;
use crate::registry::SignerRegistry;
use crate::{FeedError, Result};

/// Environment variable naming the config file path.
pub const CONFIG_PATH_ENV: &str = "OCR_FEED_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "feed.toml";

/// Complete feed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed metadata and answer bounds.
    #[serde(default)]
    pub feed: FeedSection,
    /// Oracle set.
    #[serde(default)]
    pub oracles: OracleSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSection {
    #[serde(default)]
    pub description: String,
    /// Implicit decimal places of answers.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// 32-byte feed identifier, hex. Empty = all zeros.
    #[serde(default)]
    pub feed_id: String,
    /// Inclusive lower answer bound, decimal. Absent = unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_answer: Option<String>,
    /// Inclusive upper answer bound, decimal. Absent = unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSection {
    /// Fault threshold.
    #[serde(default = "default_f")]
    pub f: u8,
    #[serde(default = "default_config_count")]
    pub config_count: u64,
    /// Signer addresses, hex. Position is the observer index.
    #[serde(default)]
    pub signers: Vec<String>,
    /// Transmitter addresses, hex.
    #[serde(default)]
    pub transmitters: Vec<String>,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

fn default_f() -> u8 {
    1
}

fn default_config_count() -> u64 {
    1
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            description: String::new(),
            decimals: default_decimals(),
            feed_id: String::new(),
            min_answer: None,
            max_answer: None,
        }
    }
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            f: default_f(),
            config_count: default_config_count(),
            signers: Vec::new(),
            transmitters: Vec::new(),
        }
    }
}

impl FeedConfig {
    /// Load from `$OCR_FEED_CONFIG`, or `feed.toml` in the working directory.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "no feed config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FeedError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FeedError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| FeedError::Config(e.to_string()))
    }

    fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Build the configuration and signer registry this file describes.
    ///
    /// The configuration digest is derived from the feed id and oracle set.
    ///
    /// # Errors
    ///
    /// [`FeedError::Config`] for unparseable values, otherwise whatever
    /// [`Configuration`] or [`SignerRegistry`] reject.
    pub fn build(&self) -> Result<(Configuration, SignerRegistry)> {
        let feed_id = if self.feed.feed_id.is_empty() {
            [0u8; 32]
        } else {
            parse_hex_array::<32>("feed_id", &self.feed.feed_id)?
        };
        let signers = parse_addresses("signer", &self.oracles.signers)?;
        let transmitters = parse_addresses("transmitter", &self.oracles.transmitters)?;

        let min = parse_bound("min_answer", self.feed.min_answer.as_deref())?
            .unwrap_or(Observation::MIN);
        let max = parse_bound("max_answer", self.feed.max_answer.as_deref())?
            .unwrap_or(Observation::MAX);

        let config = Configuration::derive(
            &feed_id,
            self.oracles.config_count,
            &signers,
            &transmitters,
            self.oracles.f,
        )?
        .with_answer_bounds(min, max)?;
        let registry = SignerRegistry::from_oracles(&signers, &transmitters)?;
        Ok((config, registry))
    }
}

fn parse_hex_array<const N: usize>(field: &str, value: &str) -> Result<[u8; N]> {
    let trimmed = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(trimmed)
        .map_err(|e| FeedError::Config(format!("{field}: invalid hex {value:?}: {e}")))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        FeedError::Config(format!("{field}: expected {N} bytes, got {}", b.len()))
    })
}

fn parse_addresses(field: &str, values: &[String]) -> Result<Vec<Address>> {
    values
        .iter()
        .map(|v| parse_hex_array::<ADDRESS_LEN>(field, v))
        .collect()
}

fn parse_bound(field: &str, value: Option<&str>) -> Result<Option<Observation>> {
    value
        .map(|v| {
            v.trim()
                .parse::<Observation>()
                .map_err(|e| FeedError::Config(format!("{field}: {v:?}: {e}")))
        })
        .transpose()
}
