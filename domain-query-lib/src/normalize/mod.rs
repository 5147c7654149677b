//! Response normalization.
//!
//! Both registries answer in wildly different shapes; these parsers reduce
//! either one to the canonical [`NormalizedRecord`](crate::NormalizedRecord).
//! Parsing never fails: any field the payload doesn't yield degrades to the
//! `"Unknown"` / 0 sentinels.

mod rdap;
mod whois;

pub use rdap::parse_rdap;
pub use whois::parse_whois;

use crate::types::{NormalizedRecord, UNKNOWN};
use chrono::{NaiveDate, Utc};

/// Keep only the date portion of a timestamp, cutting at the `T` separator.
pub(crate) fn date_portion(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.split_once('T') {
        Some((date, _)) => date.to_string(),
        None => trimmed.to_string(),
    }
}

/// Whole days elapsed since `date` (negative for future dates), 0 when the
/// date is the Unknown sentinel or unparsable.
fn days_since(date: &str, today: NaiveDate) -> i64 {
    if date == UNKNOWN {
        return 0;
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => (today - parsed).num_days(),
        Err(_) => 0,
    }
}

/// Whole days until `date` (negative once past), 0 when unknown.
fn days_until(date: &str, today: NaiveDate) -> i64 {
    if date == UNKNOWN {
        return 0;
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => (parsed - today).num_days(),
        Err(_) => 0,
    }
}

/// Derive `age_in_days`/`remaining_days` from the record's dates.
///
/// Recomputed on every resolution; the counts are never carried over from a
/// previous parse.
pub(crate) fn apply_day_counts(record: &mut NormalizedRecord) {
    let today = Utc::now().date_naive();
    record.age_in_days = days_since(&record.registration_date, today);
    record.remaining_days = days_until(&record.expiration_date, today);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_portion_truncates_at_t() {
        assert_eq!(date_portion("2020-01-01T00:00:00Z"), "2020-01-01");
        assert_eq!(date_portion(" 2020-01-01 "), "2020-01-01");
        assert_eq!(date_portion("Unknown"), "Unknown");
    }

    #[test]
    fn test_day_counts() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        assert_eq!(days_since("2024-01-01", today), 10);
        assert_eq!(days_until("2024-01-21", today), 10);
        assert_eq!(days_until("2024-01-01", today), -10);
    }

    #[test]
    fn test_unknown_or_garbage_dates_yield_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        assert_eq!(days_since(UNKNOWN, today), 0);
        assert_eq!(days_since("not-a-date", today), 0);
        assert_eq!(days_until("00Z", today), 0);
    }
}
