// ABOUTME: Diagnostics accumulator for non-fatal warnings during a pipeline run.
// ABOUTME: Warnings let the pipeline continue but are reported in the final summary.

use serde::Serialize;

/// Collects non-fatal warnings raised by stages.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.warn(warning);
        }
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal condition observed while running a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// An allow-listed operation failed in a way treated as "already done".
    pub fn benign_duplicate(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::BenignDuplicate,
            message: message.into(),
        }
    }

    /// Rollout status could not be confirmed inside the check window.
    pub fn rollout_unconfirmed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::RolloutUnconfirmed,
            message: message.into(),
        }
    }

    /// Best-effort cleanup of test data failed.
    pub fn cleanup_failed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CleanupFailed,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Resource already existed (e.g. namespace creation on re-run).
    BenignDuplicate,
    /// Workload rollout did not report complete in time.
    RolloutUnconfirmed,
    /// Verification data could not be removed afterwards.
    CleanupFailed,
}
