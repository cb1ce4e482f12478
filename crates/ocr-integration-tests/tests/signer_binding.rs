//! Integration test: signatures are bound to observer indices and to the
//! exact report bytes.

use ocr_crypto::secp256k1::SigningKey;
use ocr_feed::{codec, FeedError};
use ocr_integration_tests::{report_for, OracleSet};

fn setup() -> (OracleSet, ocr_feed::Feed) {
    let oracles = OracleSet::new(4, 1, 1).expect("oracle set");
    let feed = oracles.feed().expect("feed");
    (oracles, feed)
}

#[test]
fn swapped_signatures_rejected() {
    let (oracles, feed) = setup();
    let report = report_for(&feed, 1, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let mut signatures = oracles.sign(&report).expect("sign");
    signatures.swap(0, 1);

    assert!(matches!(
        feed.submit(&oracles.transmitter(), &report, &signatures),
        Err(FeedError::InvalidSigner { index: 0, .. })
    ));
}

#[test]
fn observer_claiming_another_index_rejected() {
    let (oracles, feed) = setup();
    // Signer 3 signs but the report claims the observation came from 2.
    let report = report_for(&feed, 1, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let digest = report.digest().expect("digest");
    let signatures = vec![
        oracles.keys[0].sign_digest(&digest),
        oracles.keys[1].sign_digest(&digest),
        oracles.keys[3].sign_digest(&digest),
    ];

    let result = feed.submit(&oracles.transmitter(), &report, &signatures);
    assert!(
        matches!(&result, Err(FeedError::InvalidSigner { index: 2, signer, .. }) if *signer == oracles.keys[3].address()),
        "{result:?}"
    );
}

#[test]
fn outsider_signature_rejected() {
    let (oracles, feed) = setup();
    let outsider = SigningKey::from_bytes(&[0x77; 32]).expect("key");
    let report = report_for(&feed, 1, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let digest = report.digest().expect("digest");
    let mut signatures = oracles.sign(&report).expect("sign");
    signatures[1] = outsider.sign_digest(&digest);

    assert!(matches!(
        feed.submit(&oracles.transmitter(), &report, &signatures),
        Err(FeedError::InvalidSigner { index: 1, .. })
    ));
}

#[test]
fn duplicate_observer_rejected() {
    let (oracles, feed) = setup();
    let report = report_for(&feed, 1, 0, vec![0, 1, 1], vec![1, 2, 3]);
    let signatures = oracles.sign(&report).expect("sign");

    assert!(matches!(
        feed.submit(&oracles.transmitter(), &report, &signatures),
        Err(FeedError::DuplicateSigner { observer: 1 })
    ));
}

#[test]
fn signer_cannot_transmit() {
    let (oracles, feed) = setup();
    let report = report_for(&feed, 1, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let signatures = oracles.sign(&report).expect("sign");

    assert!(matches!(
        feed.submit(&oracles.keys[0].address(), &report, &signatures),
        Err(FeedError::Unauthorized { .. })
    ));
}

#[test]
fn flipped_report_bit_breaks_every_signature() {
    let (oracles, feed) = setup();
    let report = report_for(&feed, 1, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let signatures = oracles.sign(&report).expect("sign");
    let bytes = report.encode().expect("encode");

    // Flip the lowest bit of the last observation: still a well-formed
    // report, but with a different digest.
    let mut tampered = bytes.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 1;
    let decoded = codec::decode(&tampered).expect("still decodes");
    assert_eq!(decoded.observations, vec![1, 2, 2]);

    let result = feed.transmit(&oracles.transmitter(), &tampered, &signatures);
    assert!(
        matches!(
            result,
            Err(FeedError::InvalidSigner { index: 0, .. })
                | Err(FeedError::InvalidSignature { index: 0, .. })
        ),
        "{result:?}"
    );

    // The untampered bytes are still accepted afterwards.
    let t = feed
        .transmit(&oracles.transmitter(), &bytes, &signatures)
        .expect("accepted");
    assert_eq!(t.answer, 2);
}

#[test]
fn raw_and_offset_recovery_ids_both_accepted() {
    let (oracles, feed) = setup();
    let report = report_for(&feed, 1, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let mut signatures = oracles.sign(&report).expect("sign");
    signatures[0].v -= 27;

    feed.submit(&oracles.transmitter(), &report, &signatures)
        .expect("v in {0, 1} accepted");

    let next = report_for(&feed, 2, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let mut signatures = oracles.sign(&next).expect("sign");
    signatures[2].v = 29;
    assert!(matches!(
        feed.submit(&oracles.transmitter(), &next, &signatures),
        Err(FeedError::InvalidSignature { index: 2, .. })
    ));
}
