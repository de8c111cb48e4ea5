// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the boundary between the filesystem and the pure `kernels`.
// Nothing below it touches a file; nothing inside it makes a processing decision.
//
// Data Flow:
//
//   1. [reader]      station export on disk   -> Vec<RawRecord>
//   2. [timestamps]  Vec<RawRecord>           -> NormalizedSeries (parsed, sorted, unique)
//
//         ... kernels: gap filling, segmentation ...
//
//   3. [exporter]    &Segment                 -> <prefix>_<n>.csv  (+ optional manifest.json)
//
// ====================================================================================
pub mod exporter;
pub mod format;
pub mod reader;
pub mod timestamps;

pub use exporter::{ExportedSegment, SegmentExporter};
pub use reader::{read_records, read_records_from, RawRecord};
pub use timestamps::{normalize_records, parse_timestamp, NormalizedSeries};

#[cfg(test)]
mod tests;
