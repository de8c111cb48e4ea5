//! Turns raw records into a normalized series: parsed timestamps, time order,
//! unique instants.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::bridge::reader::RawRecord;
use crate::error::PipelineError;
use crate::types::Sample;

/// Date-time layouts accepted in the first column, tried in order.
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight. Slash dates are month-first.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a station timestamp. Offsets (RFC 3339) are converted to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }
    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(raw, layout).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// A series that satisfies the ordering and uniqueness invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub series: Vec<Sample>,
    /// True if the records had to be re-ordered.
    pub reordered: bool,
    /// Records dropped because an earlier record had the same timestamp.
    pub duplicates_dropped: usize,
}

/// Parses every timestamp, stable-sorts by time and keeps the first record of
/// each instant.
pub fn normalize_records(records: Vec<RawRecord>) -> Result<NormalizedSeries, PipelineError> {
    let mut series = Vec::with_capacity(records.len());
    for record in records {
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| {
            PipelineError::at_line(
                record.line,
                format!("unrecognized date-time {:?}", record.timestamp),
            )
        })?;
        series.push(Sample::original(timestamp, record.value));
    }

    let reordered = !series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp);
    if reordered {
        series.sort_by_key(|s| s.timestamp);
    }

    let before = series.len();
    series.dedup_by_key(|s| s.timestamp);
    let duplicates_dropped = before - series.len();

    Ok(NormalizedSeries {
        series,
        reordered,
        duplicates_dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn record(line: u64, ts: &str, value: f64) -> RawRecord {
        RawRecord {
            line,
            timestamp: ts.to_string(),
            value,
        }
    }

    #[test]
    fn test_accepted_layouts() {
        let expected = dt(2024, 5, 17, 8, 30, 0);
        for raw in [
            "2024-05-17 08:30:00",
            "2024-05-17T08:30:00",
            "2024-05-17 08:30",
            "2024/05/17 08:30:00",
            "05/17/2024 08:30:00",
            "2024-05-17T10:30:00+02:00",
            "  2024-05-17 08:30:00  ",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "layout {:?}", raw);
        }
        assert_eq!(parse_timestamp("2024-05-17"), Some(dt(2024, 5, 17, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("2024-05-17 08:30:00.250"),
            Some(expected + chrono::TimeDelta::milliseconds(250))
        );
    }

    #[test]
    fn test_slash_dates_are_month_first() {
        assert_eq!(parse_timestamp("05/06/2024 12:00"), Some(dt(2024, 5, 6, 12, 0, 0)));
        assert_eq!(parse_timestamp("05/06/2024"), Some(dt(2024, 5, 6, 0, 0, 0)));
        assert_eq!(parse_timestamp("17/05/2024 08:30:00"), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_timestamp("Date"), None);
        assert_eq!(parse_timestamp("2024-13-01 00:00:00"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let records = vec![
            record(1, "2024-01-01 00:02:00", 3.0),
            record(2, "2024-01-01 00:00:00", 1.0),
            record(3, "2024-01-01 00:01:00", 2.0),
            record(4, "2024-01-01 00:01:00", 99.0),
        ];
        let normalized = normalize_records(records).unwrap();
        assert!(normalized.reordered);
        assert_eq!(normalized.duplicates_dropped, 1);
        let values: Vec<f64> = normalized.series.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_normalize_reports_the_offending_line() {
        let records = vec![
            record(1, "2024-01-01 00:00:00", 1.0),
            record(2, "yesterday", 2.0),
        ];
        let err = normalize_records(records).unwrap_err();
        match err {
            PipelineError::InputParse(message) => assert!(message.contains("line 2")),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
