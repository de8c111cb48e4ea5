//! This module sequences the kernels into a complete run and reports on it.
//! It owns the run state machine (`orchestrator`), the event plumbing that
//! keeps the pipeline off the caller's UI state (`events`), and the worker
//! thread wrapper (`runner`).

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod events;
pub mod orchestrator;
pub mod runner;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use events::{ChannelSink, LogCrateSink, LogSink, PipelineEvent, ProgressSink, Severity};
pub use orchestrator::{run, Phase, Pipeline, Summary};
pub use runner::{PipelineRunner, RunGuard, RunHandle, RunSlot};
