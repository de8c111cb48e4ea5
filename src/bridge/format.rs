// In: src/bridge/format.rs

//! Defines all on-disk structures and constants for the segment artifacts.
//! This is the single source of truth for column names, file naming and the
//! optional run manifest.

use std::path::{Path, PathBuf};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

//==================================================================================
// I. Artifact Layout
//==================================================================================

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const VALUE_COLUMN: &str = "value";
pub const STATUS_COLUMN: &str = "status";

/// Extension of every segment artifact.
pub const SEGMENT_EXTENSION: &str = "csv";
/// File name of the run manifest, written next to the segments.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
/// The current version of the manifest layout.
pub const MANIFEST_VERSION: u16 = 1;

/// The Arrow schema every segment is materialized with before it is written.
pub fn segment_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(TIMESTAMP_COLUMN, DataType::Utf8, false),
        Field::new(VALUE_COLUMN, DataType::Float64, false),
        Field::new(STATUS_COLUMN, DataType::Utf8, false),
    ]))
}

/// `<dir>/<prefix>_<index>.csv`
pub fn segment_file_path(dir: &Path, prefix: &str, index: usize) -> PathBuf {
    dir.join(format!("{}_{}.{}", prefix, index, SEGMENT_EXTENSION))
}

//==================================================================================
// II. Manifest
//==================================================================================

/// Metadata for a single segment artifact.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentManifestEntry {
    pub index: usize,
    pub file_name: String,
    pub rows: usize,
    pub interpolated_rows: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Describes one completed export: where the input came from and what was written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunManifest {
    pub version: u16,
    pub writer_version: String,
    pub source: String,
    pub input_rows: usize,
    pub rows_interpolated: usize,
    pub sampling_interval_secs: i64,
    pub segments: Vec<SegmentManifestEntry>,
}
