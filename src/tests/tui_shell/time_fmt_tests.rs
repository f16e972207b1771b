use time::macros::datetime;

use super::*;

#[test]
fn commit_timestamp_shows_absolute_and_relative() {
    let now = datetime!(2024-05-01 15:30 UTC);
    assert_eq!(
        fmt_commit_ts("2024-05-01T12:30:00Z", now),
        "2024-05-01 12:30Z (3h ago)"
    );
    assert_eq!(
        fmt_commit_ts("2024-05-01T17:30:00+02:00", now),
        "2024-05-01 15:30Z (just now)"
    );
}

#[test]
fn future_or_unparseable_timestamps() {
    let now = datetime!(2024-05-01 15:30 UTC);
    assert_eq!(fmt_commit_ts("2024-05-02T00:00:00Z", now), "2024-05-02 00:00Z");
    assert_eq!(fmt_commit_ts("yesterday", now), "yesterday");
}
