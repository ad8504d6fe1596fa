// ABOUTME: StepExecutor trait and the tokio::process implementation.
// ABOUTME: Any spawn failure or non-zero exit is surfaced as-is to the caller.

use super::CommandSpec;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Captured output of a successful step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Errors from running a step.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {}", exit_label(*code), stderr.trim())]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("{program} was cancelled")]
    Cancelled { program: String },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

impl ExecError {
    /// Everything the failed process said, for signature matching.
    pub fn output_text(&self) -> String {
        match self {
            ExecError::NonZeroExit { stdout, stderr, .. } => format!("{}\n{}", stderr, stdout),
            ExecError::Spawn { source, .. } => source.to_string(),
            ExecError::Cancelled { .. } => String::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled { .. })
    }
}

/// Runs a single external action.
///
/// Implementations are stateless between calls and must return promptly once
/// `cancel` fires.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<StepOutput, ExecError>;
}

#[async_trait]
impl<T: StepExecutor + ?Sized> StepExecutor for &T {
    async fn execute(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<StepOutput, ExecError> {
        (**self).execute(spec, cancel).await
    }
}

/// Executes steps as local child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl StepExecutor for ProcessExecutor {
    async fn execute(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<StepOutput, ExecError> {
        let program = spec.program().to_string();

        let mut command = Command::new(spec.program());
        command
            .args(spec.get_args())
            .envs(spec.get_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = spec.get_current_dir() {
            command.current_dir(dir);
        }

        tracing::debug!(command = %spec, "running step");

        // Dropping the output future kills the child (kill_on_drop).
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(command = %spec, "step cancelled");
                return Err(ExecError::Cancelled { program });
            }
            output = command.output() => output.map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(StepOutput { stdout, stderr })
        } else {
            tracing::debug!(
                command = %spec,
                code = ?output.status.code(),
                "step failed"
            );
            Err(ExecError::NonZeroExit {
                program,
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}
