// In: src/pipeline/orchestrator.rs

//! The top-level coordinator of a run.
//!
//! A run walks `Loading → TimestampNormalization → GapFilling → Segmenting →
//! Exporting → Completed`. Every transition emits a status line and a
//! progress checkpoint; any error moves the run to the absorbing `Failed`
//! state, emits an error line, resets progress to 0 and returns the error.
//! Artifacts already written stay on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::bridge::{self, ExportedSegment, SegmentExporter};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::kernels::{self, MonteCarloEstimator};
use crate::pipeline::events::{LogSink, ProgressSink, ProgressTracker, Severity};

//==================================================================================
// 0. Progress Checkpoints
//==================================================================================
const LOAD_START: f64 = 0.05;
const TIMESTAMPS_NORMALIZED: f64 = 0.15;
const GAP_SCAN_START: f64 = 0.25;
const GAP_SCAN_SPAN: f64 = 0.35;
const SEGMENTING_START: f64 = 0.65;
const EXPORT_START: f64 = 0.75;
const EXPORT_SPAN: f64 = 0.20;
const COMPLETED: f64 = 1.0;

//==================================================================================
// 1. Public Types
//==================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    TimestampNormalization,
    GapFilling,
    Segmenting,
    Exporting,
    Completed,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Loading => "loading",
            Phase::TimestampNormalization => "timestamp normalization",
            Phase::GapFilling => "gap filling",
            Phase::Segmenting => "segmenting",
            Phase::Exporting => "exporting",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// The outcome of a successful run.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Summary {
    /// Records read from the input file.
    pub input_rows: usize,
    /// Records dropped because their timestamp was already present.
    pub duplicates_dropped: usize,
    /// Samples synthesized by the gap filler.
    pub rows_interpolated: usize,
    /// One entry per artifact, in segment order.
    pub segments: Vec<ExportedSegment>,
    /// Path of `manifest.json`, if one was requested.
    pub manifest: Option<PathBuf>,
}

impl Summary {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Rows across all artifacts, interpolated ones included.
    pub fn rows_written(&self) -> usize {
        self.segments.iter().map(|s| s.rows).sum()
    }

    /// True when the input held no samples at all.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

//==================================================================================
// 2. Pipeline
//==================================================================================

/// A configured pipeline. Cheap to clone; the config is shared.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Arc::new(PipelineConfig::default()))
    }
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the whole pipeline on the calling thread.
    pub fn run(
        &self,
        input_path: &Path,
        output_dir: &Path,
        progress_sink: &dyn ProgressSink,
        log_sink: &dyn LogSink,
    ) -> Result<Summary, PipelineError> {
        let mut state = RunState {
            phase: Phase::Loading,
            tracker: ProgressTracker::new(progress_sink),
            log_sink,
        };

        match self.execute(&mut state, input_path, output_dir) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                let failed_in = state.phase;
                state.phase = Phase::Failed;
                log::error!("pipeline failed during {}: {}", failed_in, err);
                state.emit(
                    Severity::Error,
                    &format!("Error during {}: {}", failed_in, err),
                );
                state.tracker.reset("Failed");
                Err(err)
            }
        }
    }

    fn execute(
        &self,
        state: &mut RunState<'_>,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<Summary, PipelineError> {
        let config = &*self.config;
        let run_started = Instant::now();

        // --- Loading ---
        state.emit(Severity::Info, "Processing started...");
        state.transition(Phase::Loading, LOAD_START, "Loading data...");
        config.validate()?;
        let interval = config.sampling_interval()?;

        let records = bridge::read_records(input_path, &config.input)?;
        let input_rows = records.len();
        state.emit(
            Severity::Success,
            &format!("Data loaded successfully. Found {} data points.", input_rows),
        );

        // --- Timestamp normalization ---
        state.transition(
            Phase::TimestampNormalization,
            TIMESTAMPS_NORMALIZED,
            "Processing timestamps...",
        );
        let normalized = bridge::normalize_records(records)?;
        if normalized.reordered {
            state.emit(
                Severity::Warning,
                "Input was not in time order; samples were sorted by timestamp.",
            );
        }
        if normalized.duplicates_dropped > 0 {
            state.emit(
                Severity::Warning,
                &format!(
                    "Dropped {} sample(s) with a duplicate timestamp.",
                    normalized.duplicates_dropped
                ),
            );
        }
        if normalized.series.is_empty() {
            state.emit(Severity::Warning, "Input contains no data points.");
        }

        // --- Gap filling ---
        state.transition(Phase::GapFilling, GAP_SCAN_START, "Checking for time gaps...");
        state.emit(
            Severity::Info,
            "Checking for time gaps and interpolating using Monte Carlo simulation...",
        );
        let phase_started = Instant::now();
        let mut estimator = MonteCarloEstimator::new(&config.estimator);
        let filled = kernels::fill_single_gaps(normalized.series, interval, &mut estimator, |p| {
            state.tracker.advance(
                GAP_SCAN_START + p.fraction() * GAP_SCAN_SPAN,
                &format!("Interpolating: {}/{}", p.scanned, p.total),
            );
        })?;
        log_metric!(
            "event" = "gap_fill",
            "rows" = filled.series.len(),
            "interpolated" = filled.interpolated,
            "elapsed_ms" = phase_started.elapsed().as_millis()
        );
        state.emit(
            Severity::Success,
            &format!(
                "Interpolated {} data points using Monte Carlo simulation.",
                filled.interpolated
            ),
        );

        // --- Segmenting ---
        state.transition(Phase::Segmenting, SEGMENTING_START, "Identifying segments...");
        state.emit(Severity::Info, "Identifying segments...");
        let segments = kernels::split_segments(filled.series, interval, config.gap_policy);
        state.emit(
            Severity::Success,
            &format!("Identified {} segments.", segments.len()),
        );

        // --- Exporting ---
        state.transition(Phase::Exporting, EXPORT_START, "Saving segments...");
        let exporter = SegmentExporter::create(output_dir, &config.export)?;
        let total = segments.len();
        let mut exported = Vec::with_capacity(total);
        for segment in &segments {
            let written = exporter.write_segment(segment)?;
            state.tracker.advance(
                EXPORT_START + (written.index as f64 / total as f64) * EXPORT_SPAN,
                &format!("Saving segment {}/{}", written.index, total),
            );
            state.emit(
                Severity::Success,
                &format!(
                    "Saved segment {} with {} data points to {}",
                    written.index,
                    written.rows,
                    written.path.display()
                ),
            );
            exported.push(written);
        }

        let manifest = if config.export.write_manifest {
            Some(exporter.write_manifest(
                input_path,
                input_rows,
                filled.interpolated,
                config.sampling_interval_secs,
                &exported,
            )?)
        } else {
            None
        };

        // --- Completed ---
        state.transition(Phase::Completed, COMPLETED, "Completed");
        state.emit(Severity::Complete, "Processing completed successfully!");
        log_metric!(
            "event" = "run_complete",
            "input_rows" = input_rows,
            "segments" = exported.len(),
            "elapsed_ms" = run_started.elapsed().as_millis()
        );

        Ok(Summary {
            input_rows,
            duplicates_dropped: normalized.duplicates_dropped,
            rows_interpolated: filled.interpolated,
            segments: exported,
            manifest,
        })
    }
}

/// Runs the pipeline with the default configuration.
pub fn run(
    input_path: &Path,
    output_dir: &Path,
    progress_sink: &dyn ProgressSink,
    log_sink: &dyn LogSink,
) -> Result<Summary, PipelineError> {
    Pipeline::default().run(input_path, output_dir, progress_sink, log_sink)
}

//==================================================================================
// 3. Run State
//==================================================================================

struct RunState<'a> {
    phase: Phase,
    tracker: ProgressTracker<'a>,
    log_sink: &'a dyn LogSink,
}

impl RunState<'_> {
    fn transition(&mut self, phase: Phase, fraction: f64, label: &str) {
        log::debug!("phase {} -> {}", self.phase, phase);
        self.phase = phase;
        self.tracker.advance(fraction, label);
    }

    fn emit(&self, severity: Severity, message: &str) {
        self.log_sink.log(severity, message);
    }
}
