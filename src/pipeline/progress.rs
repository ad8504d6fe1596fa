// ABOUTME: Stage-boundary progress events and the sinks that receive them.
// ABOUTME: Exactly one event precedes and one follows every stage that runs.

use super::Stage;
use crate::types::{ArtifactReference, Environment, ImageTag};
use parking_lot::Mutex;

/// Progress narration emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    PipelineStarted {
        environment: Environment,
        image_tag: ImageTag,
    },
    StageStarted {
        stage: Stage,
    },
    StageFinished {
        stage: Stage,
        outcome: StageOutcome,
    },
    PipelineSucceeded {
        environment: Environment,
        artifact: ArtifactReference,
    },
    PipelineFailed {
        stage: Stage,
        message: String,
    },
}

/// How a stage ended, as narrated to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    /// Completed; each entry is a warning message.
    Warned(Vec<String>),
    Failed(String),
    Cancelled,
}

/// Receives progress events in the order they happen.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

impl<T: ProgressSink + ?Sized> ProgressSink for &T {
    fn emit(&self, event: &ProgressEvent) {
        (**self).emit(event);
    }
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Keeps every event in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: &ProgressEvent) {
        self.events.lock().push(event.clone());
    }
}
