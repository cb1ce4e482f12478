//! Integration test: one full reporting round with f = 3.
//!
//! Ten signers tolerate three faults; a report needs seven signatures. A
//! transmitter submits a report whose observations all equal 100 USD at
//! 8 decimals, the feed answer becomes that value, and replaying the same
//! report is rejected as stale.

use ocr_feed::{codec, FeedError};
use ocr_integration_tests::{quorum_observers, report_for, OracleSet};
use ocr_types::scale;

#[test]
fn full_round_f3() {
    let oracles = OracleSet::new(10, 3, 1).expect("oracle set");
    let feed = oracles.feed().expect("feed");
    assert_eq!(feed.configuration().quorum(), 7);

    let price = 100 * scale(feed.decimals()).expect("scale");
    let report = report_for(&feed, 1, 1, quorum_observers(3), vec![price; 7]);
    let signatures = oracles.sign(&report).expect("sign");
    let bytes = report.encode().expect("encode");
    assert_eq!(bytes.len(), codec::HEADER_LEN + 7 * codec::OBSERVATION_LEN);

    let transmission = feed
        .transmit(&oracles.transmitter(), &bytes, &signatures)
        .expect("accepted");
    assert_eq!(transmission.answer, 10_000_000_000);
    assert_eq!((transmission.epoch, transmission.round), (1, 1));
    assert_eq!(feed.latest_answer(), 10_000_000_000);

    let details = feed.latest_transmission_details();
    assert_eq!(details.config_digest, feed.configuration().config_digest());
    assert_eq!((details.epoch, details.round, details.round_id), (1, 1, 1));

    let replay = feed.transmit(&oracles.transmitter(), &bytes, &signatures);
    assert!(matches!(
        replay,
        Err(FeedError::StaleReport {
            epoch: 1,
            round: 1,
            last_epoch: 1,
            last_round: 1
        })
    ));
    assert_eq!(feed.latest_transmission_details().round_id, 1);
}

#[test]
fn any_quorum_subset_can_report() {
    let oracles = OracleSet::new(10, 3, 1).expect("oracle set");
    let feed = oracles.feed().expect("feed");

    // Observers 3..=9 instead of 0..=6, listed out of order.
    let observers = vec![9, 3, 7, 4, 8, 5, 6];
    let observations = vec![7, 1, 5, 2, 6, 3, 4];
    let report = report_for(&feed, 2, 0, observers, observations);
    let signatures = oracles.sign(&report).expect("sign");

    let transmission = feed
        .submit(&oracles.transmitter(), &report, &signatures)
        .expect("accepted");
    assert_eq!(transmission.answer, 4);
}
