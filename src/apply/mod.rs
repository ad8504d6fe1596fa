// ABOUTME: Idempotent applier: runs a step whose failure is expected on re-run.
// ABOUTME: An injected classifier decides which executor errors become warnings.

mod classifier;

pub use classifier::{
    AllowListed, AlreadyExists, FailureClass, FailureClassifier, Strict, matches_already_exists,
};

use crate::diagnostics::Warning;
use crate::exec::{CommandSpec, StepExecutor};
use crate::pipeline::{StageError, StageResult};
use tokio_util::sync::CancellationToken;

/// Wraps a step executor with an explicit benign-vs-fatal failure policy.
///
/// This is the pipeline's idempotence boundary: the wrapped primitive (for
/// example `kubectl create namespace`) is not idempotent itself, but re-running
/// the pipeline must be safe.
pub struct IdempotentApplier<E, C> {
    executor: E,
    classifier: C,
}

impl<E: StepExecutor, C: FailureClassifier> IdempotentApplier<E, C> {
    pub fn new(executor: E, classifier: C) -> Self {
        Self {
            executor,
            classifier,
        }
    }

    /// Run `spec`, downgrading failures the classifier deems benign to a warning.
    ///
    /// Cancellation is never downgraded, whatever the classifier says.
    pub async fn apply_idempotent(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> StageResult<()> {
        let err = match self.executor.execute(spec, cancel).await {
            Ok(_) => return StageResult::Success(()),
            Err(err) => err,
        };

        if err.is_cancelled() {
            return StageResult::HardFailure(StageError::Cancelled);
        }

        match self.classifier.classify(&err) {
            FailureClass::BenignDuplicate => {
                // Logged once, when the controller records the warning.
                tracing::debug!(command = %spec, error = %err, "treating failure as benign duplicate");
                let warning = Warning::benign_duplicate(format!("{}: {}", spec, err));
                StageResult::Warning((), vec![warning])
            }
            FailureClass::Fatal => StageResult::HardFailure(StageError::Step {
                step: spec.to_string(),
                source: err,
            }),
        }
    }
}
