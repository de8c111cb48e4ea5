//! This module defines the core, strongly-typed data representations used
//! throughout the pipeline.
//!
//! It includes the `Sample` record with its provenance tag, the `Segment` that
//! the exporter consumes, and the gap classification shared by the gap filler
//! and the segmenter.

pub mod gap;
pub mod sample;

// Re-export the main type(s) for easier access.
pub use gap::{classify_gap, GapKind};
pub use sample::{Sample, SampleStatus, Segment};
