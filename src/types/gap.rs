//! Classification of the spacing between two adjacent samples.
//!
//! With a nominal sampling interval `I`, a gap `d` between consecutive
//! timestamps falls into exactly one class:
//!
//! | duration        | class        |
//! |-----------------|--------------|
//! | `d <= I`        | `Contiguous` |
//! | `I < d < 2I`    | `Irregular`  |
//! | `d == 2I`       | `Fillable`   |
//! | `d > 2I`        | `Break`      |

use chrono::TimeDelta;

use crate::config::GapPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// No sample is missing.
    Contiguous,
    /// Longer than one interval but not a whole missing sample.
    Irregular,
    /// Exactly one sample is missing and can be synthesized.
    Fillable,
    /// More than one sample is missing.
    Break,
}

impl GapKind {
    /// Whether a gap of this kind, still present after gap filling, ends a segment.
    pub fn splits_segment(self, policy: GapPolicy) -> bool {
        match (self, policy) {
            (GapKind::Break, _) => true,
            (GapKind::Irregular | GapKind::Fillable, GapPolicy::Strict) => true,
            _ => false,
        }
    }
}

/// Classifies the spacing `delta` against the sampling `interval`.
pub fn classify_gap(delta: TimeDelta, interval: TimeDelta) -> GapKind {
    // Doubling was checked when the config was validated; saturate anyway.
    let double = interval.checked_mul(2).unwrap_or(TimeDelta::MAX);
    if delta <= interval {
        GapKind::Contiguous
    } else if delta < double {
        GapKind::Irregular
    } else if delta == double {
        GapKind::Fillable
    } else {
        GapKind::Break
    }
}
