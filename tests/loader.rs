use std::path::PathBuf;

use subtrack::loader::load_records;
use subtrack::record::sample_subscriptions;
use subtrack::{SubTrackError, SubscriptionTable};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn csv_fixture_matches_the_samples() {
    let records = load_records(fixture("subscriptions.csv")).unwrap();
    assert_eq!(records, sample_subscriptions());
}

#[test]
fn loaded_records_drive_the_table() {
    let records = load_records(fixture("subscriptions.csv")).unwrap();
    let table = SubscriptionTable::new(records);
    let view = table.view();
    assert_eq!(view.filtered_count, 6);
    assert_eq!(view.rows[0].cells[0], "WSJ Digital");
}

#[test]
fn directories_are_rejected() {
    let err = load_records(fixture("")).unwrap_err();
    assert!(matches!(err, SubTrackError::LoadingFailed(_)));
}
