// ABOUTME: Readiness probes: single boolean-or-error checks of a remote condition.
// ABOUTME: Includes a closure adapter and a probe backed by a step executor.

use crate::exec::{CommandSpec, ExecError, StepExecutor};
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Why a probe attempt could not answer.
///
/// The poller does not distinguish causes; the message is only reported.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ProbeError(pub String);

impl From<ExecError> for ProbeError {
    fn from(err: ExecError) -> Self {
        ProbeError(err.to_string())
    }
}

pub type ProbeResult = Result<bool, ProbeError>;

/// A single check of whether a condition currently holds.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, cancel: &CancellationToken) -> ProbeResult;

    /// Short label used in logs.
    fn describe(&self) -> &str {
        "probe"
    }
}

/// Adapts an async closure into a probe.
pub struct FnProbe<F> {
    label: String,
    check: F,
}

/// Build a probe from a closure returning a future.
pub fn probe_fn<F, Fut>(label: impl Into<String>, check: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeResult> + Send,
{
    FnProbe {
        label: label.into(),
        check,
    }
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeResult> + Send,
{
    async fn check(&self, _cancel: &CancellationToken) -> ProbeResult {
        (self.check)().await
    }

    fn describe(&self) -> &str {
        &self.label
    }
}

/// Ready when the command exits zero, e.g. `kubectl rollout status`.
pub struct CommandProbe<E> {
    executor: E,
    spec: CommandSpec,
    label: String,
}

impl<E: StepExecutor> CommandProbe<E> {
    pub fn new(executor: E, spec: CommandSpec) -> Self {
        let label = spec.to_string();
        Self {
            executor,
            spec,
            label,
        }
    }
}

#[async_trait]
impl<E: StepExecutor> Probe for CommandProbe<E> {
    async fn check(&self, cancel: &CancellationToken) -> ProbeResult {
        match self.executor.execute(&self.spec, cancel).await {
            Ok(_) => Ok(true),
            Err(err) => Err(err.into()),
        }
    }

    fn describe(&self) -> &str {
        &self.label
    }
}
