//! The pure, stateless processing kernels of the pipeline.
//!
//! Each kernel takes a time-ordered series and returns a new value; none of
//! them touch the filesystem or emit events directly. The orchestrator wires
//! them together and turns their progress callbacks into pipeline events.

pub mod estimator;
pub mod gap_filler;
pub mod segmenter;

pub use estimator::{GapEstimator, MonteCarloEstimator};
pub use gap_filler::{fill_single_gaps, GapFillOutcome, ScanProgress};
pub use segmenter::split_segments;
