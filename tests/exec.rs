// ABOUTME: Integration tests for the local process executor.
// ABOUTME: Exercises real child processes through sh.

use deployline::exec::{CommandSpec, ExecError, ProcessExecutor, StepExecutor};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh").args(["-c", script])
}

#[tokio::test]
async fn captures_stdout_on_success() {
    let output = ProcessExecutor
        .execute(&sh("echo hello"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(output.stdout.trim(), "hello");
}

#[tokio::test]
async fn passes_environment_bindings() {
    let spec = sh("printf %s \"$DEPLOYLINE_BOUND_VAR\"").env("DEPLOYLINE_BOUND_VAR", "bound");
    let output = ProcessExecutor
        .execute(&spec, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(output.stdout, "bound");
}

#[tokio::test]
async fn non_zero_exit_carries_code_and_stderr() {
    let err = ProcessExecutor
        .execute(&sh("echo nope >&2; exit 3"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ExecError::NonZeroExit { code, stderr, .. } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr.trim(), "nope");
        }
        other => panic!("expected non-zero exit, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_binary_is_a_spawn_error() {
    let err = ProcessExecutor
        .execute(
            &CommandSpec::new("deployline-no-such-binary"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Spawn { .. }));
}

#[tokio::test]
async fn cancellation_stops_a_running_step() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let err = ProcessExecutor
        .execute(&sh("sleep 30"), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(10));
}
