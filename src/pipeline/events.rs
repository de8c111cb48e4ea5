//! Status and progress reporting.
//!
//! The pipeline never touches caller-owned state. Everything it has to say
//! goes through two sinks: a `ProgressSink` for `(fraction, label)` pairs and
//! a `LogSink` for `(severity, message)` lines. Closures implement both traits,
//! `ChannelSink` turns them into `PipelineEvent`s on a `flume` channel for a
//! presentation thread, and `LogCrateSink` forwards them to the `log` facade.

use std::fmt;

use serde::Serialize;

//==================================================================================
// 1. Event Model
//==================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Complete,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Everything a run reports, in emission order.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    Progress { fraction: f64, label: String },
    Log { severity: Severity, message: String },
}

//==================================================================================
// 2. Sink Traits
//==================================================================================

pub trait ProgressSink {
    fn progress(&self, fraction: f64, label: &str);
}

pub trait LogSink {
    fn log(&self, severity: Severity, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(f64, &str),
{
    fn progress(&self, fraction: f64, label: &str) {
        self(fraction, label)
    }
}

impl<F> LogSink for F
where
    F: Fn(Severity, &str),
{
    fn log(&self, severity: Severity, message: &str) {
        self(severity, message)
    }
}

//==================================================================================
// 3. Concrete Sinks
//==================================================================================

/// Sends every emission as a `PipelineEvent` over a channel. Sending never
/// blocks; a dropped receiver is ignored so the run still completes.
#[derive(Clone)]
pub struct ChannelSink {
    sender: flume::Sender<PipelineEvent>,
}

impl ChannelSink {
    pub fn new(sender: flume::Sender<PipelineEvent>) -> Self {
        Self { sender }
    }

    /// Creates a sink together with the receiving end of an unbounded channel.
    pub fn unbounded() -> (Self, flume::Receiver<PipelineEvent>) {
        let (sender, receiver) = flume::unbounded();
        (Self::new(sender), receiver)
    }
}

impl ProgressSink for ChannelSink {
    fn progress(&self, fraction: f64, label: &str) {
        let _ = self.sender.send(PipelineEvent::Progress {
            fraction,
            label: label.to_string(),
        });
    }
}

impl LogSink for ChannelSink {
    fn log(&self, severity: Severity, message: &str) {
        let _ = self.sender.send(PipelineEvent::Log {
            severity,
            message: message.to_string(),
        });
    }
}

/// Forwards emissions to the `log` facade, for headless callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrateSink;

impl ProgressSink for LogCrateSink {
    fn progress(&self, fraction: f64, label: &str) {
        log::debug!("[{:>3.0}%] {}", fraction * 100.0, label);
    }
}

impl LogSink for LogCrateSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => log::error!("{}", message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Info | Severity::Success | Severity::Complete => log::info!("{}", message),
        }
    }
}

//==================================================================================
// 4. Progress Tracker
//==================================================================================

/// Wraps a `ProgressSink` so emitted fractions stay in `[0, 1]` and never move
/// backwards. `reset` is the only way down and is reserved for failure.
pub(crate) struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    current: f64,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, current: 0.0 }
    }

    pub(crate) fn advance(&mut self, fraction: f64, label: &str) {
        let clamped = if fraction.is_nan() {
            self.current
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.current = self.current.max(clamped);
        self.sink.progress(self.current, label);
    }

    pub(crate) fn reset(&mut self, label: &str) {
        self.current = 0.0;
        self.sink.progress(0.0, label);
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> f64 {
        self.current
    }
}
