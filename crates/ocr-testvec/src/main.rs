//! Test vector generator for the OCR feed.
//!
//! Writes `tests/fixtures/test_vectors.json` with the hashing, address,
//! report encoding, signature, configuration digest, and aggregation vectors
//! other implementations must reproduce byte for byte.
//!
//! Usage:
//!   ocr-testvec              # Generate test_vectors.json
//!   ocr-testvec --verify     # Verify test_vectors.json against this build

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ocr_crypto::blake3::{self, contexts};
use ocr_crypto::secp256k1::{self, SigningKey};
use ocr_crypto::Address;
use ocr_feed::configuration::compute_config_digest;
use ocr_feed::{Configuration, Feed, Report, SignerRegistry};
use ocr_types::{Observation, ReportContext};

const VECTORS_PATH: &str = "tests/fixtures/test_vectors.json";

const FEED_ID: [u8; 32] = [7u8; 32];
const TRANSMITTER: Address = [0xee; 20];

#[derive(Serialize, Deserialize)]
struct TestVectors {
    version: String,
    generated_by: String,
    vectors: BTreeMap<String, TestVector>,
}

#[derive(Serialize, Deserialize)]
struct TestVector {
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

fn vector(
    description: impl Into<String>,
    inputs: impl IntoIterator<Item = (&'static str, String)>,
    outputs: impl IntoIterator<Item = (&'static str, String)>,
) -> TestVector {
    let collect = |items: Vec<(&'static str, String)>| {
        items
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>()
    };
    TestVector {
        description: description.into(),
        inputs: collect(inputs.into_iter().collect()),
        outputs: collect(outputs.into_iter().collect()),
    }
}

fn signer_keys(n: u8) -> anyhow::Result<Vec<SigningKey>> {
    (1..=n)
        .map(|i| SigningKey::from_bytes(&[i; 32]).context("fixed seed is a valid scalar"))
        .collect()
}

fn sample_report() -> Report {
    Report::new(
        ReportContext::new([0x42; 16], 1, 2),
        vec![2, 0, 1],
        vec![-1, 100_000_000, 2],
    )
}

fn generate_blake3_vectors() -> BTreeMap<String, TestVector> {
    let mut vectors = BTreeMap::new();
    for context in contexts::ALL_CONTEXTS {
        let key = blake3::derive_key(context, &[0u8; 32]);
        let name = format!(
            "blake3_derive_key_{}",
            context.trim_start_matches("OCR v1 ").replace('-', "_")
        );
        vectors.insert(
            name,
            vector(
                format!("BLAKE3::derive_key(\"{context}\", 0x00*32)"),
                [
                    ("context", context.to_string()),
                    ("key_material", hex::encode([0u8; 32])),
                ],
                [("derived_key", hex::encode(key))],
            ),
        );
    }
    vectors
}

fn generate_address_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();
    for (i, key) in signer_keys(4)?.iter().enumerate() {
        vectors.insert(
            format!("signer_address_{}", i + 1),
            vector(
                "last 20 bytes of BLAKE3::derive_key(\"OCR v1 signer-address\", X || Y)",
                [("secret_key", hex::encode(*key.to_bytes()))],
                [("address", hex::encode(key.address()))],
            ),
        );
    }
    Ok(vectors)
}

fn generate_report_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();
    let report = sample_report();
    let encoded = report.encode()?;
    let digest = report.digest()?;

    vectors.insert(
        "report_encoding".to_string(),
        vector(
            "context word | observers | BE32 count | BE i128 observations",
            [
                ("config_digest", hex::encode(report.context.config_digest)),
                ("epoch", report.context.epoch.to_string()),
                ("round", report.context.round.to_string()),
                ("observers", hex::encode(&report.observers)),
                ("observations", join(&report.observations)),
            ],
            [
                ("encoded", hex::encode(&encoded)),
                ("digest", hex::encode(digest)),
            ],
        ),
    );

    // RFC 6979 nonces make the signature deterministic.
    let key = SigningKey::from_bytes(&[1u8; 32])?;
    let signature = key.sign_digest(&digest);
    let recovered = secp256k1::recover(&digest, &signature)?;
    vectors.insert(
        "report_signature".to_string(),
        vector(
            "recoverable secp256k1 ECDSA over the report digest",
            [
                ("secret_key", hex::encode(*key.to_bytes())),
                ("digest", hex::encode(digest)),
            ],
            [
                ("signature", hex::encode(signature.to_bytes())),
                ("recovered_address", hex::encode(recovered)),
            ],
        ),
    );
    Ok(vectors)
}

fn generate_config_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let signers: Vec<Address> = signer_keys(4)?.iter().map(SigningKey::address).collect();
    let digest = compute_config_digest(&FEED_ID, 1, &signers, &[TRANSMITTER], 1);
    let signer_hex: Vec<String> = signers.iter().map(hex::encode).collect();

    Ok(BTreeMap::from([(
        "config_digest".to_string(),
        vector(
            "BLAKE3::derive_key(\"OCR v1 config-digest\", fields)[..16]",
            [
                ("feed_id", hex::encode(FEED_ID)),
                ("config_count", "1".to_string()),
                ("signers", signer_hex.join(",")),
                ("transmitters", hex::encode(TRANSMITTER)),
                ("f", "1".to_string()),
            ],
            [("config_digest", hex::encode(digest))],
        ),
    )]))
}

fn generate_aggregation_vector() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let keys = signer_keys(4)?;
    let signers: Vec<Address> = keys.iter().map(SigningKey::address).collect();
    let config = Configuration::derive(&FEED_ID, 1, &signers, &[TRANSMITTER], 1)?;
    let registry = SignerRegistry::from_oracles(&signers, &[TRANSMITTER])?;
    let feed = Feed::new("test vector feed", 8, config.clone(), registry)?;

    let report = Report::new(
        ReportContext::new(config.config_digest(), 1, 1),
        vec![3, 0, 1],
        vec![10_100_000_000, -5, 9_950_000_000],
    );
    let encoded = report.encode()?;
    let digest = report.digest()?;
    let signatures: Vec<_> = report
        .observers
        .iter()
        .map(|&i| keys[usize::from(i)].sign_digest(&digest))
        .collect();
    let transmission = feed.transmit(&TRANSMITTER, &encoded, &signatures)?;

    Ok(BTreeMap::from([(
        "feed_median_answer".to_string(),
        vector(
            "accepted report answer is the median observation",
            [
                ("report", hex::encode(&encoded)),
                ("observations", join(&report.observations)),
            ],
            [
                ("answer", transmission.answer.to_string()),
                ("round_id", transmission.round_id.to_string()),
            ],
        ),
    )]))
}

fn join(observations: &[Observation]) -> String {
    observations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn generate_all_vectors() -> anyhow::Result<TestVectors> {
    let mut all_vectors = BTreeMap::new();

    all_vectors.extend(generate_blake3_vectors());
    all_vectors.extend(generate_address_vectors()?);
    all_vectors.extend(generate_report_vectors()?);
    all_vectors.extend(generate_config_vectors()?);
    all_vectors.extend(generate_aggregation_vector()?);

    Ok(TestVectors {
        version: "1.0".to_string(),
        generated_by: "ocr-testvec".to_string(),
        vectors: all_vectors,
    })
}

fn verify_vectors(vectors: &TestVectors) -> anyhow::Result<bool> {
    let regenerated = generate_all_vectors()?;
    let mut all_pass = true;

    for (name, expected) in &vectors.vectors {
        match regenerated.vectors.get(name) {
            Some(actual) if actual.outputs == expected.outputs => info!(%name, "pass"),
            Some(actual) => {
                warn!(
                    %name,
                    expected = ?expected.outputs,
                    actual = ?actual.outputs,
                    "mismatch"
                );
                all_pass = false;
            }
            None => {
                warn!(%name, "missing");
                all_pass = false;
            }
        }
    }

    Ok(all_pass)
}

fn write_vectors(path: &Path, vectors: &TestVectors) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(vectors)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(count = vectors.vectors.len(), path = %path.display(), "generated test vectors");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("ocr=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = Path::new(VECTORS_PATH);
    let verify = std::env::args().any(|a| a == "--verify");

    let vectors = if verify && path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).with_context(|| format!("parsing {VECTORS_PATH}"))?
    } else {
        if verify {
            info!(path = VECTORS_PATH, "no existing test vectors, generating");
        }
        let vectors = generate_all_vectors()?;
        write_vectors(path, &vectors)?;
        vectors
    };

    if !verify_vectors(&vectors)? {
        bail!("test vector verification failed");
    }
    info!("all test vectors verified");
    Ok(())
}
