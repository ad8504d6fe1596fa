// ABOUTME: Stage outcome type consumed by the pipeline controller.
// ABOUTME: Success and Warning continue the pipeline; HardFailure aborts it.

use super::StageError;
use crate::diagnostics::Warning;

/// Outcome of a stage or of a sub-step inside a stage.
///
/// Produced by a stage and consumed immediately by its caller.
#[derive(Debug)]
#[must_use = "a hard failure must abort the pipeline"]
pub enum StageResult<T = ()> {
    Success(T),
    /// Completed, but with conditions the operator should see.
    Warning(T, Vec<Warning>),
    /// Unconditionally aborts the remaining pipeline.
    HardFailure(StageError),
}

impl<T> StageResult<T> {
    /// `Success` when there are no warnings, `Warning` otherwise.
    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        if warnings.is_empty() {
            StageResult::Success(value)
        } else {
            StageResult::Warning(value, warnings)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StageResult::Success(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, StageResult::Warning(..))
    }

    pub fn is_hard_failure(&self) -> bool {
        matches!(self, StageResult::HardFailure(_))
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            StageResult::Warning(_, warnings) => warnings,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&StageError> {
        match self {
            StageResult::HardFailure(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageResult<U> {
        match self {
            StageResult::Success(v) => StageResult::Success(f(v)),
            StageResult::Warning(v, w) => StageResult::Warning(f(v), w),
            StageResult::HardFailure(e) => StageResult::HardFailure(e),
        }
    }

    /// Split into the value plus warnings, or the hard failure.
    pub fn into_parts(self) -> Result<(T, Vec<Warning>), StageError> {
        match self {
            StageResult::Success(v) => Ok((v, Vec::new())),
            StageResult::Warning(v, w) => Ok((v, w)),
            StageResult::HardFailure(e) => Err(e),
        }
    }
}

impl<T> From<Result<T, StageError>> for StageResult<T> {
    fn from(result: Result<T, StageError>) -> Self {
        match result {
            Ok(v) => StageResult::Success(v),
            Err(e) => StageResult::HardFailure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_warning_list_is_success() {
        let result = StageResult::with_warnings(1, vec![]);
        assert!(result.is_success());
    }

    #[test]
    fn warnings_survive_map() {
        let result = StageResult::with_warnings(1, vec![Warning::rollout_unconfirmed("slow")])
            .map(|v| v + 1);
        assert!(result.is_warning());
        let (value, warnings) = result.into_parts().unwrap();
        assert_eq!(value, 2);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn hard_failure_exposes_error() {
        let result: StageResult<()> = StageResult::HardFailure(StageError::NoIdentifier);
        assert!(result.is_hard_failure());
        assert!(matches!(result.error(), Some(StageError::NoIdentifier)));
    }
}
