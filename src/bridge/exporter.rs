//! Writes segments to disk, one CSV artifact per segment.
//!
//! Each segment is materialized as an Arrow `RecordBatch` with the
//! `timestamp,value,status` schema from `format` and handed to Arrow's CSV
//! writer, which emits the header row.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::csv::Writer;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::bridge::format::{self, RunManifest, SegmentManifestEntry};
use crate::config::ExportConfig;
use crate::error::PipelineError;
use crate::types::Segment;

/// What was written for one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedSegment {
    /// 1-based segment index, also the artifact identifier.
    pub index: usize,
    pub path: PathBuf,
    pub rows: usize,
    pub interpolated_rows: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ExportedSegment {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn manifest_entry(&self) -> SegmentManifestEntry {
        SegmentManifestEntry {
            index: self.index,
            file_name: self.file_name(),
            rows: self.rows,
            interpolated_rows: self.interpolated_rows,
            start: self.start,
            end: self.end,
        }
    }
}

pub struct SegmentExporter {
    output_dir: PathBuf,
    config: ExportConfig,
}

impl SegmentExporter {
    /// Prepares the destination, creating the directory (and parents) if absent.
    pub fn create(output_dir: &Path, config: &ExportConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        std::fs::create_dir_all(output_dir).map_err(|e| {
            PipelineError::OutputWrite(format!(
                "cannot create output directory '{}': {}",
                output_dir.display(),
                e
            ))
        })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            config: config.clone(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifact_path(&self, index: usize) -> PathBuf {
        format::segment_file_path(&self.output_dir, &self.config.file_prefix, index)
    }

    /// Writes one segment. An existing artifact with the same name is replaced.
    pub fn write_segment(&self, segment: &Segment) -> Result<ExportedSegment, PipelineError> {
        let (start, end) = match (segment.start(), segment.end()) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(PipelineError::InternalError(format!(
                    "segment {} is empty",
                    segment.index()
                )))
            }
        };

        let path = self.artifact_path(segment.index());
        let batch = self.to_record_batch(segment)?;
        let write_err = |e: &dyn std::fmt::Display| {
            PipelineError::OutputWrite(format!("cannot write '{}': {}", path.display(), e))
        };

        let file = File::create(&path).map_err(|e| write_err(&e))?;
        let mut writer = Writer::new(BufWriter::new(file));
        writer.write(&batch).map_err(|e| write_err(&e))?;
        writer.into_inner().flush().map_err(|e| write_err(&e))?;

        log::debug!("wrote {} rows to {}", segment.len(), path.display());
        Ok(ExportedSegment {
            index: segment.index(),
            path,
            rows: segment.len(),
            interpolated_rows: segment.interpolated_count(),
            start,
            end,
        })
    }

    /// Writes `manifest.json` describing the whole run.
    pub fn write_manifest(
        &self,
        source: &Path,
        input_rows: usize,
        rows_interpolated: usize,
        sampling_interval_secs: i64,
        segments: &[ExportedSegment],
    ) -> Result<PathBuf, PipelineError> {
        let manifest = RunManifest {
            version: format::MANIFEST_VERSION,
            writer_version: crate::VERSION.to_string(),
            source: source.display().to_string(),
            input_rows,
            rows_interpolated,
            sampling_interval_secs,
            segments: segments.iter().map(ExportedSegment::manifest_entry).collect(),
        };
        let path = self.output_dir.join(format::MANIFEST_FILE_NAME);
        let json = serde_json::to_vec_pretty(&manifest).map_err(|e| {
            PipelineError::OutputWrite(format!("cannot serialize manifest: {}", e))
        })?;
        std::fs::write(&path, json).map_err(|e| {
            PipelineError::OutputWrite(format!("cannot write '{}': {}", path.display(), e))
        })?;
        Ok(path)
    }

    fn to_record_batch(&self, segment: &Segment) -> Result<RecordBatch, PipelineError> {
        let samples = segment.samples();
        let timestamps: StringArray = samples
            .iter()
            .map(|s| Some(s.timestamp.format(&self.config.timestamp_format).to_string()))
            .collect();
        let values: Float64Array = samples.iter().map(|s| Some(s.value)).collect();
        let statuses: StringArray = samples.iter().map(|s| Some(s.status.label())).collect();

        let columns: Vec<ArrayRef> = vec![Arc::new(timestamps), Arc::new(values), Arc::new(statuses)];
        RecordBatch::try_new(format::segment_schema(), columns).map_err(|e| {
            PipelineError::InternalError(format!(
                "cannot assemble segment {}: {}",
                segment.index(),
                e
            ))
        })
    }
}
