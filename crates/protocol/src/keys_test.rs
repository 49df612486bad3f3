//! Tests for key construction

use chrono::TimeZone;

use super::*;

#[test]
fn test_ts_key() {
    assert_eq!(ts_key("error"), "ts:error");
}

#[test]
fn test_archive_key() {
    assert_eq!(archive_key(1714521600, "1714557600123-0"), "logs:1714521600:1714557600123-0");
}

#[test]
fn test_day_bucket_truncates_to_midnight() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 13, 45, 12).unwrap();
    let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    assert_eq!(day_bucket(at), midnight.timestamp());
}

#[test]
fn test_day_bucket_stable_within_day() {
    let morning = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 1).unwrap();
    let night = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap();
    assert_eq!(day_bucket(morning), day_bucket(night));
}
