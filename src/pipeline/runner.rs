//! Runs the pipeline on a dedicated worker thread.
//!
//! A presentation layer keeps its own thread responsive and drains the
//! `RunHandle`'s event channel. The runner owns a `RunSlot` so a second run
//! cannot start while one is still active; the core itself is not reentrant.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::pipeline::events::{ChannelSink, PipelineEvent};
use crate::pipeline::orchestrator::{Pipeline, Summary};

//==================================================================================
// 1. Single-Run Slot
//==================================================================================

/// At most one holder at a time. Cloning shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct RunSlot {
    busy: Arc<AtomicBool>,
}

impl RunSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or returns `None` if a run already holds it.
    pub fn try_acquire(&self) -> Option<RunGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot when dropped, including when the worker panics.
#[derive(Debug)]
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

//==================================================================================
// 2. Runner
//==================================================================================

#[derive(Debug, Clone)]
pub struct PipelineRunner {
    pipeline: Pipeline,
    slot: RunSlot,
}

impl PipelineRunner {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self {
            pipeline: Pipeline::new(config),
            slot: RunSlot::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_busy()
    }

    /// Starts a run on a new thread. Fails with `AlreadyRunning` if a run
    /// started by this runner (or a clone of it) has not finished yet.
    pub fn spawn(&self, input_path: PathBuf, output_dir: PathBuf) -> Result<RunHandle, PipelineError> {
        let guard = self.slot.try_acquire().ok_or(PipelineError::AlreadyRunning)?;
        let (sink, events) = ChannelSink::unbounded();
        let pipeline = self.pipeline.clone();

        let worker = thread::Builder::new()
            .name("tidegauge-pipeline".to_string())
            .spawn(move || {
                let _guard = guard;
                pipeline.run(&input_path, &output_dir, &sink, &sink)
            })
            .map_err(|e| PipelineError::InternalError(format!("cannot spawn worker: {}", e)))?;

        Ok(RunHandle { events, worker })
    }
}

//==================================================================================
// 3. Handle
//==================================================================================

pub struct RunHandle {
    events: flume::Receiver<PipelineEvent>,
    worker: JoinHandle<Result<Summary, PipelineError>>,
}

impl RunHandle {
    /// The event stream. It disconnects once the run has finished.
    pub fn events(&self) -> &flume::Receiver<PipelineEvent> {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the run and returns its result. Undelivered events are dropped.
    pub fn join(self) -> Result<Summary, PipelineError> {
        self.worker
            .join()
            .map_err(|_| PipelineError::InternalError("pipeline worker panicked".to_string()))?
    }

    /// Waits for the run, collecting every event it emitted.
    pub fn wait(self) -> (Vec<PipelineEvent>, Result<Summary, PipelineError>) {
        let events: Vec<PipelineEvent> = self.events.iter().collect();
        (events, self.join())
    }
}
