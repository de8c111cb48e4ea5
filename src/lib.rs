//! This file is the root of the `tidegauge` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`pipeline`, `kernels`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types a caller needs to configure and drive
//!     a run, so `tidegauge::Pipeline` works without knowing the module layout.
//!
//! The `tidegauge` binary (`src/main.rs`) is a thin command-line shell over
//! `pipeline::PipelineRunner`.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod kernels;
pub mod pipeline;
pub mod types;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use config::{EstimatorConfig, ExportConfig, GapPolicy, InputConfig, PipelineConfig};
pub use error::{ErrorKind, PipelineError};
pub use pipeline::{
    run, ChannelSink, LogCrateSink, LogSink, Pipeline, PipelineEvent, PipelineRunner,
    ProgressSink, RunHandle, Severity, Summary,
};
pub use types::{Sample, SampleStatus, Segment};
