//! Integration test: quorum arithmetic across fault thresholds.

use ocr_feed::{Configuration, FeedError};
use ocr_integration_tests::{quorum_observers, report_for, OracleSet};
use ocr_types::MAX_ORACLES;

#[test]
fn exact_quorum_accepted_for_every_f() {
    for f in 0u8..=10 {
        let n = 3 * usize::from(f) + 1;
        let oracles = OracleSet::new(n, f, 1).expect("oracle set");
        let feed = oracles.feed().expect("feed");
        let quorum = 2 * usize::from(f) + 1;
        assert_eq!(feed.configuration().quorum(), quorum);

        let report = report_for(
            &feed,
            1,
            0,
            quorum_observers(f),
            (0..quorum as i128).collect(),
        );
        let signatures = oracles.sign(&report).expect("sign");
        let t = feed
            .submit(&oracles.transmitter(), &report, &signatures)
            .expect("accepted");
        assert_eq!(t.answer, i128::from(f), "median of 0..2f+1 is f");
    }
}

#[test]
fn one_short_and_one_over_rejected() {
    let oracles = OracleSet::new(7, 2, 1).expect("oracle set");
    let feed = oracles.feed().expect("feed");

    for observers in [vec![0u8, 1, 2, 3], vec![0u8, 1, 2, 3, 4, 5]] {
        let count = observers.len();
        let report = report_for(&feed, 1, 0, observers, vec![1; count]);
        let signatures = oracles.sign(&report).expect("sign");
        let result = feed.submit(&oracles.transmitter(), &report, &signatures);
        assert!(
            matches!(result, Err(FeedError::QuorumMismatch { required: 5, .. })),
            "{count} observers: {result:?}"
        );
    }
}

#[test]
fn signature_count_must_match_observers() {
    let oracles = OracleSet::new(4, 1, 1).expect("oracle set");
    let feed = oracles.feed().expect("feed");
    let report = report_for(&feed, 1, 0, vec![0, 1, 2], vec![1, 2, 3]);
    let mut signatures = oracles.sign(&report).expect("sign");
    signatures.pop();

    assert!(matches!(
        feed.submit(&oracles.transmitter(), &report, &signatures),
        Err(FeedError::QuorumMismatch {
            required: 3,
            signatures: 2,
            observers: 3
        })
    ));
}

#[test]
fn signer_set_bounds() {
    assert!(Configuration::new(3 * 10 + 1, 10, [0; 16]).is_ok());
    assert!(Configuration::new(MAX_ORACLES + 1, 10, [0; 16]).is_err());
    assert!(OracleSet::new(9, 3, 1)
        .expect("oracle set")
        .configure(1)
        .is_err());
}
