//! The canonical representation of a single tide-gauge measurement and of a
//! contiguous run of them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a sample's value came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    /// Read from the input file.
    Original,
    /// Synthesized by the gap filler.
    Interpolated,
}

impl SampleStatus {
    /// The tag written to the `status` column of an artifact.
    pub fn label(self) -> &'static str {
        match self {
            SampleStatus::Original => "OK",
            SampleStatus::Interpolated => "Interpolated",
        }
    }
}

impl fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub status: SampleStatus,
}

impl Sample {
    pub fn original(timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            timestamp,
            value,
            status: SampleStatus::Original,
        }
    }

    pub fn interpolated(timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            timestamp,
            value,
            status: SampleStatus::Interpolated,
        }
    }

    pub fn is_interpolated(&self) -> bool {
        self.status == SampleStatus::Interpolated
    }
}

/// A maximal run of temporally contiguous samples.
///
/// Segments are produced by the segmenter, never empty, and immutable once
/// formed. `index` is 1-based and doubles as the artifact identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    index: usize,
    samples: Vec<Sample>,
}

impl Segment {
    pub(crate) fn new(index: usize, samples: Vec<Sample>) -> Self {
        debug_assert!(index >= 1, "segment indices are 1-based");
        debug_assert!(!samples.is_empty(), "segments are never empty");
        Self { index, samples }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.samples.last().map(|s| s.timestamp)
    }

    pub fn interpolated_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_interpolated()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(SampleStatus::Original.to_string(), "OK");
        assert_eq!(SampleStatus::Interpolated.to_string(), "Interpolated");
    }

    #[test]
    fn test_segment_accessors() {
        let segment = Segment::new(
            2,
            vec![
                Sample::original(at(0), 1.0),
                Sample::interpolated(at(1), 1.5),
                Sample::original(at(2), 2.0),
            ],
        );
        assert_eq!(segment.index(), 2);
        assert_eq!(segment.len(), 3);
        assert_eq!(segment.start(), Some(at(0)));
        assert_eq!(segment.end(), Some(at(2)));
        assert_eq!(segment.interpolated_count(), 1);
    }
}
