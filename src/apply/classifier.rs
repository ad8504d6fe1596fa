// ABOUTME: Failure classification policies for idempotent apply.
// ABOUTME: Makes "benign duplicate" a declared policy rather than an ad-hoc string match.

use crate::exec::ExecError;

/// How an executor failure should be treated by the idempotent applier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The resource is already in the desired state; continue with a warning.
    BenignDuplicate,
    /// A genuine failure; the stage must abort.
    Fatal,
}

/// Decides whether an executor error is a benign duplicate.
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, err: &ExecError) -> FailureClass;
}

impl<F> FailureClassifier for F
where
    F: Fn(&ExecError) -> FailureClass + Send + Sync,
{
    fn classify(&self, err: &ExecError) -> FailureClass {
        self(err)
    }
}

/// Whether the failed command's output carries the "already exists" signature.
///
/// kubectl reports `Error from server (AlreadyExists): ... already exists`.
pub fn matches_already_exists(err: &ExecError) -> bool {
    let text = err.output_text().to_lowercase();
    text.contains("already exists") || text.contains("alreadyexists")
}

/// Benign only when the process ran and reported the "already exists" signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlreadyExists;

impl FailureClassifier for AlreadyExists {
    fn classify(&self, err: &ExecError) -> FailureClass {
        match err {
            ExecError::NonZeroExit { .. } if matches_already_exists(err) => {
                FailureClass::BenignDuplicate
            }
            _ => FailureClass::Fatal,
        }
    }
}

/// Policy for the single allow-listed operation (namespace creation).
///
/// Any non-zero exit is benign, including ambiguous ones (authorization or
/// network errors that cannot be told apart from a duplicate). A tool that
/// could not be started at all is still fatal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowListed;

impl FailureClassifier for AllowListed {
    fn classify(&self, err: &ExecError) -> FailureClass {
        match err {
            ExecError::NonZeroExit { .. } => FailureClass::BenignDuplicate,
            ExecError::Spawn { .. } | ExecError::Cancelled { .. } => FailureClass::Fatal,
        }
    }
}

/// Every failure is fatal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl FailureClassifier for Strict {
    fn classify(&self, _err: &ExecError) -> FailureClass {
        FailureClass::Fatal
    }
}
