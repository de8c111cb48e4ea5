//! Detects single missing samples and synthesizes them.
//!
//! A gap of exactly two sampling intervals between consecutive samples means
//! one reading was lost. The filler inserts a sample at `t + I` whose value
//! comes from a `GapEstimator`, tagged `Interpolated`. Every other spacing is
//! left untouched; larger gaps are the segmenter's business.

use chrono::TimeDelta;

use crate::error::PipelineError;
use crate::kernels::estimator::GapEstimator;
use crate::types::{classify_gap, GapKind, Sample};

/// Number of progress reports emitted over one full scan.
const PROGRESS_REPORTS_PER_SCAN: usize = 20;

/// Progress of the gap scan, reported in batches of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    /// Adjacent pairs inspected so far.
    pub scanned: usize,
    /// Adjacent pairs in the series (`len - 1`).
    pub total: usize,
    /// Samples synthesized so far.
    pub inserted: usize,
}

impl ScanProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.scanned as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapFillOutcome {
    /// The time-ordered series with synthesized samples merged in.
    pub series: Vec<Sample>,
    /// How many samples were synthesized.
    pub interpolated: usize,
}

/// Fills every gap of exactly `2 * interval` in a time-ordered series.
///
/// `on_progress` is called once before the first pair, then every
/// `max(1, total / 20)` pairs. It is advisory only.
pub fn fill_single_gaps<E, F>(
    series: Vec<Sample>,
    interval: TimeDelta,
    estimator: &mut E,
    mut on_progress: F,
) -> Result<GapFillOutcome, PipelineError>
where
    E: GapEstimator + ?Sized,
    F: FnMut(ScanProgress),
{
    if series.len() < 2 {
        return Ok(GapFillOutcome {
            series,
            interpolated: 0,
        });
    }

    let total = series.len() - 1;
    let report_every = std::cmp::max(1, total / PROGRESS_REPORTS_PER_SCAN);
    let mut filled = Vec::with_capacity(series.len() + series.len() / 8);
    let mut inserted = 0usize;

    for (i, pair) in series.windows(2).enumerate() {
        if i % report_every == 0 {
            on_progress(ScanProgress {
                scanned: i,
                total,
                inserted,
            });
        }

        let (current, next) = (&pair[0], &pair[1]);
        filled.push(*current);

        if classify_gap(next.timestamp - current.timestamp, interval) == GapKind::Fillable {
            let value = estimator.estimate(current.value, next.value)?;
            filled.push(Sample::interpolated(current.timestamp + interval, value));
            inserted += 1;
        }
    }
    filled.extend(series.last().copied());

    // Stable: ties keep their input order.
    filled.sort_by_key(|s| s.timestamp);

    on_progress(ScanProgress {
        scanned: total,
        total,
        inserted,
    });

    Ok(GapFillOutcome {
        series: filled,
        interpolated: inserted,
    })
}
