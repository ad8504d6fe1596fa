// ABOUTME: Stage-level and pipeline-level error types.
// ABOUTME: The controller wraps every stage error with the name of the failing stage.

use snafu::Snafu;

use super::Stage;
use crate::exec::ExecError;
use crate::types::{ManifestName, ParseArtifactRefError};
use crate::verify::HttpError;

/// Hard failures raised inside a stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// An external step exited non-zero or could not be started.
    #[error("`{step}` failed: {source}")]
    Step {
        step: String,
        #[source]
        source: ExecError,
    },

    /// A manifest in the ordered set failed to apply.
    #[error("failed to apply {manifest}: {source}")]
    ManifestApply {
        manifest: ManifestName,
        #[source]
        source: ExecError,
    },

    /// A readiness wait ran out of attempts.
    #[error("{target} did not become ready after {attempts} attempts{}", last_error_suffix(last_error))]
    NotReady {
        target: String,
        attempts: u32,
        last_error: Option<String>,
    },

    /// An HTTP call could not be completed.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: HttpError,
    },

    /// The service answered with a non-2xx status.
    #[error("{method} {url} returned HTTP {status}")]
    UnexpectedStatus {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// The service answered with a body that is not a product record.
    #[error("invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// The service accepted a create but did not assign an id.
    #[error("no identifier returned")]
    NoIdentifier,

    /// A read-back returned a record that does not match what was written.
    #[error("data integrity violation: {field} expected {expected:?}, got {actual:?}")]
    IntegrityViolation {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("invalid artifact reference: {0}")]
    Artifact(#[from] ParseArtifactRefError),

    #[error("cancelled")]
    Cancelled,
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(" (last error: {})", e),
        None => String::new(),
    }
}

impl StageError {
    /// Whether this failure is an operator abort rather than a system fault.
    pub fn is_cancelled(&self) -> bool {
        match self {
            StageError::Cancelled => true,
            StageError::Step { source, .. } | StageError::ManifestApply { source, .. } => {
                source.is_cancelled()
            }
            StageError::Request { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Why a pipeline run ended without success.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    #[snafu(display("{stage} stage failed: {source}"))]
    StageFailed { stage: Stage, source: StageError },

    #[snafu(display("pipeline cancelled during {stage} stage"))]
    Cancelled { stage: Stage },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// A stage returned a hard failure.
    HardFailure,
    /// The run was aborted through its cancellation token.
    Cancelled,
}

impl PipelineError {
    /// Classify a stage failure, separating operator aborts from faults.
    pub fn from_stage(stage: Stage, source: StageError) -> Self {
        if source.is_cancelled() {
            PipelineError::Cancelled { stage }
        } else {
            PipelineError::StageFailed { stage, source }
        }
    }

    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            PipelineError::StageFailed { .. } => PipelineErrorKind::HardFailure,
            PipelineError::Cancelled { .. } => PipelineErrorKind::Cancelled,
        }
    }

    /// The stage that was running when the pipeline stopped.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::StageFailed { stage, .. } | PipelineError::Cancelled { stage } => *stage,
        }
    }
}
