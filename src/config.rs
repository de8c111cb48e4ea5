// In: src/config.rs

//! The single source of truth for all pipeline configuration.
//!
//! `PipelineConfig` is created once at the application boundary (CLI flags, a
//! JSON file, or a GUI form) and then passed down through the system via a
//! shared, read-only `Arc<PipelineConfig>`. The core itself never reads
//! configuration from disk or from the environment; `from_json_file` exists
//! for callers.

use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// Decides which unfilled gaps end a segment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// **Default:** only gaps longer than two sampling intervals start a new
    /// segment. Irregular gaps shorter than that stay inside the segment.
    #[default]
    Lenient,

    /// Every gap longer than one sampling interval that the gap filler did not
    /// resolve starts a new segment. Useful for stations whose clock jitters.
    Strict,
}

/// How the raw input file is split into fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// Field separator. Station exports are tab-separated.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

/// Parameters of the Monte Carlo gap estimator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Number of normal draws averaged per estimate.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,

    /// Standard deviation of the draws as a fraction of `|after - before|`.
    #[serde(default = "default_spread_factor")]
    pub spread_factor: f64,

    /// Fixed seed for reproducible runs. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            num_simulations: default_num_simulations(),
            spread_factor: default_spread_factor(),
            seed: None,
        }
    }
}

/// Controls how segments land on disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Artifacts are named `<file_prefix>_<n>.csv`.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// `strftime` layout of the `timestamp` column.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// If true, a `manifest.json` describing the run is written next to the segments.
    #[serde(default)]
    pub write_manifest: bool,
}

impl ExportConfig {
    /// Rejects prefixes that would escape the output directory and layouts
    /// `chrono` cannot render.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.file_prefix.is_empty() || self.file_prefix.contains(std::path::is_separator) {
            return Err(PipelineError::InvalidConfig(format!(
                "export.file_prefix must be a plain file name, got {:?}",
                self.file_prefix
            )));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(PipelineError::InvalidConfig(format!(
                "export.timestamp_format is not a valid strftime layout: {:?}",
                self.timestamp_format
            )));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            timestamp_format: default_timestamp_format(),
            write_manifest: false,
        }
    }
}

//==================================================================================
// II. The Unified PipelineConfig
//==================================================================================

/// The single, unified configuration for a pipeline run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Nominal spacing between two samples, in seconds. A gap of exactly twice
    /// this value is filled; anything longer splits the series.
    #[serde(default = "default_sampling_interval_secs")]
    pub sampling_interval_secs: i64,

    #[serde(default)]
    pub gap_policy: GapPolicy,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub estimator: EstimatorConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling_interval_secs: default_sampling_interval_secs(),
            gap_policy: GapPolicy::default(),
            input: InputConfig::default(),
            estimator: EstimatorConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The nominal sampling interval `I`.
    pub fn sampling_interval(&self) -> Result<TimeDelta, PipelineError> {
        if self.sampling_interval_secs <= 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "sampling_interval_secs must be positive, got {}",
                self.sampling_interval_secs
            )));
        }
        TimeDelta::try_seconds(self.sampling_interval_secs).ok_or_else(|| {
            PipelineError::InvalidConfig(format!(
                "sampling_interval_secs {} is out of range",
                self.sampling_interval_secs
            ))
        })
    }

    /// Checks every field the pipeline relies on. Called before any I/O happens.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let interval = self.sampling_interval()?;
        if interval.checked_mul(2).is_none() {
            return Err(PipelineError::InvalidConfig(
                "sampling interval is too large to double".to_string(),
            ));
        }
        if self.estimator.num_simulations == 0 {
            return Err(PipelineError::InvalidConfig(
                "estimator.num_simulations must be at least 1".to_string(),
            ));
        }
        if !self.estimator.spread_factor.is_finite() || self.estimator.spread_factor < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "estimator.spread_factor must be finite and non-negative, got {}",
                self.estimator.spread_factor
            )));
        }
        if !self.input.delimiter.is_ascii() {
            return Err(PipelineError::InvalidConfig(format!(
                "input.delimiter must be a single ASCII character, got {:?}",
                self.input.delimiter
            )));
        }
        self.export.validate()
    }
}

/// Helper for `serde` to provide a default for `sampling_interval_secs`.
fn default_sampling_interval_secs() -> i64 {
    60
}

fn default_delimiter() -> char {
    '\t'
}

fn default_num_simulations() -> usize {
    1000
}

fn default_spread_factor() -> f64 {
    0.1
}

fn default_file_prefix() -> String {
    "segment".to_string()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_station_cadence() {
        let config = PipelineConfig::default();
        assert_eq!(config.sampling_interval().unwrap(), TimeDelta::minutes(1));
        assert_eq!(config.estimator.num_simulations, 1000);
        assert_eq!(config.input.delimiter, '\t');
        assert_eq!(config.gap_policy, GapPolicy::Lenient);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_fills_in_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "sampling_interval_secs": 300, "gap_policy": "strict", "estimator": { "seed": 7 } }"#,
        )
        .unwrap();
        assert_eq!(config.sampling_interval_secs, 300);
        assert_eq!(config.gap_policy, GapPolicy::Strict);
        assert_eq!(config.estimator.seed, Some(7));
        assert_eq!(config.estimator.num_simulations, 1000);
        assert_eq!(config.export.file_prefix, "segment");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.sampling_interval_secs = 0;
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.estimator.num_simulations = 0;
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.estimator.spread_factor = f64::NAN;
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.export.file_prefix = "../escape".to_string();
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.export.timestamp_format = "%Y-%".to_string();
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json_is_a_serde_error() {
        let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, PipelineError::SerdeJson(_)));
    }
}
