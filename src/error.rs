// In: src/error.rs

//! This module defines the single, unified error type for the entire tidegauge library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

/// The coarse failure classes a caller can act on. Every `PipelineError`
/// belongs to exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file could not be read or one of its lines is malformed.
    InputParse,
    /// The destination directory or one of the artifacts could not be written.
    OutputWrite,
    /// The estimator was asked to interpolate between non-finite samples.
    Estimation,
    /// The configuration handed to the pipeline is unusable.
    Configuration,
    /// A run was refused because another one is still active.
    Busy,
    /// Anything that indicates a bug rather than bad input.
    Internal,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    // =========================================================================
    // === High-Level, Semantic Errors
    // =========================================================================
    #[error("Input parse error: {0}")]
    InputParse(String),

    #[error("Output write error: {0}")]
    OutputWrite(String),

    #[error("Cannot estimate a value between non-finite samples {before} and {after}")]
    Estimation { before: f64, after: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("A pipeline run is already in progress")]
    AlreadyRunning,

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem while loading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during config or manifest handling.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl PipelineError {
    /// Maps the error onto the failure class reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InputParse(_) => ErrorKind::InputParse,
            PipelineError::OutputWrite(_) => ErrorKind::OutputWrite,
            PipelineError::Estimation { .. } => ErrorKind::Estimation,
            PipelineError::InvalidConfig(_)
            | PipelineError::Io(_)
            | PipelineError::SerdeJson(_) => ErrorKind::Configuration,
            PipelineError::AlreadyRunning => ErrorKind::Busy,
            PipelineError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand used by the reader for line-scoped parse failures.
    pub(crate) fn at_line(line: u64, message: impl std::fmt::Display) -> Self {
        PipelineError::InputParse(format!("line {}: {}", line, message))
    }
}
