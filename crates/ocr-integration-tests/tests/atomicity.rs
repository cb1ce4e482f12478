//! Integration test: a rejected submission leaves the feed state byte for
//! byte unchanged.

use ocr_crypto::secp256k1::SigningKey;
use ocr_feed::{Feed, FeedError, Report};
use ocr_integration_tests::{report_for, OracleSet};

fn snapshot(feed: &Feed) -> Vec<u8> {
    serde_json::to_vec(&feed.state_snapshot()).expect("serialize")
}

#[test]
fn every_rejection_is_side_effect_free() {
    let oracles = OracleSet::new(4, 1, 1).expect("oracle set");
    let feed = oracles.feed().expect("feed");

    let seed = report_for(&feed, 3, 3, vec![0, 1, 2], vec![10, 20, 30]);
    let signatures = oracles.sign(&seed).expect("sign");
    feed.submit(&oracles.transmitter(), &seed, &signatures)
        .expect("seed report");
    let before = snapshot(&feed);

    let good = report_for(&feed, 4, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let good_signatures = oracles.sign(&good).expect("sign");
    let outsider = SigningKey::from_bytes(&[0x55; 32]).expect("key");

    let mut cases: Vec<(&str, Report, Vec<ocr_crypto::secp256k1::Signature>, [u8; 20])> =
        Vec::new();
    cases.push((
        "unauthorized",
        good.clone(),
        good_signatures.clone(),
        [0x01; 20],
    ));
    {
        let mut r = good.clone();
        r.context.config_digest[0] ^= 0xff;
        let s = oracles.sign(&r).expect("sign");
        cases.push(("stale config", r, s, oracles.transmitter()));
    }
    {
        let r = report_for(&feed, 3, 3, vec![0, 1, 2], vec![1, 2, 3]);
        let s = oracles.sign(&r).expect("sign");
        cases.push(("stale report", r, s, oracles.transmitter()));
    }
    cases.push((
        "short signatures",
        good.clone(),
        good_signatures[..2].to_vec(),
        oracles.transmitter(),
    ));
    {
        let mut s = good_signatures.clone();
        s[2] = outsider.sign_digest(&good.digest().expect("digest"));
        cases.push(("outsider", good.clone(), s, oracles.transmitter()));
    }
    {
        let mut s = good_signatures.clone();
        s[1].s = [0u8; 32];
        cases.push(("zero s", good.clone(), s, oracles.transmitter()));
    }
    {
        let r = report_for(&feed, 4, 0, vec![2, 2, 0], vec![1, 2, 3]);
        let s = oracles.sign(&r).expect("sign");
        cases.push(("duplicate", r, s, oracles.transmitter()));
    }
    {
        let r = report_for(&feed, 4, 0, vec![0, 1, 2], vec![1, 2]);
        cases.push(("malformed", r, good_signatures.clone(), oracles.transmitter()));
    }

    for (name, report, signatures, submitter) in cases {
        let result = feed.submit(&submitter, &report, &signatures);
        assert!(result.is_err(), "{name}: {result:?}");
        assert_eq!(snapshot(&feed), before, "{name} mutated state");
    }

    let t = feed
        .submit(&oracles.transmitter(), &good, &good_signatures)
        .expect("good report still accepted");
    assert_eq!(t.round_id, 2);
    assert_ne!(snapshot(&feed), before);
}

#[test]
fn undecodable_bytes_are_side_effect_free() {
    let oracles = OracleSet::new(4, 1, 1).expect("oracle set");
    let feed = oracles.feed().expect("feed");
    let before = snapshot(&feed);

    let report = report_for(&feed, 1, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let signatures = oracles.sign(&report).expect("sign");
    let mut bytes = report.encode().expect("encode");
    bytes.push(0);

    assert!(matches!(
        feed.transmit(&oracles.transmitter(), &bytes, &signatures),
        Err(FeedError::MalformedReport(_))
    ));
    assert_eq!(snapshot(&feed), before);
}
