//! Splits a gap-filled series into maximal runs of contiguous samples.

use chrono::TimeDelta;

use crate::config::GapPolicy;
use crate::types::{classify_gap, Sample, Segment};

/// Partitions a time-ordered series into segments.
///
/// A new segment starts wherever the gap to the previous sample splits
/// according to `policy` (by default: longer than `2 * interval`). Every input
/// sample lands in exactly one segment, in input order. An empty series yields
/// no segments.
pub fn split_segments(series: Vec<Sample>, interval: TimeDelta, policy: GapPolicy) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Vec<Sample> = Vec::new();

    for sample in series {
        if let Some(previous) = current.last() {
            let gap = classify_gap(sample.timestamp - previous.timestamp, interval);
            if gap.splits_segment(policy) {
                let index = segments.len() + 1;
                segments.push(Segment::new(index, std::mem::take(&mut current)));
            }
        }
        current.push(sample);
    }

    if !current.is_empty() {
        let index = segments.len() + 1;
        segments.push(Segment::new(index, current));
    }

    segments
}
