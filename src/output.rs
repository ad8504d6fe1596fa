// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes; narrates pipeline progress.

use crate::pipeline::{FinalStatus, ProgressEvent, ProgressSink, Stage, StageOutcome};
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    started: Instant,
    stage_started: Mutex<Option<Instant>>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started: Instant::now(),
            stage_started: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Seconds since this output was created.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print the summary of a successful run.
    pub fn finished(&self, status: &FinalStatus) {
        match self.mode {
            OutputMode::Normal => {
                for warning in &status.warnings {
                    println!("warning: {warning}");
                }
                println!(
                    "Deployed {} to {} ({:.1}s)",
                    status.artifact,
                    status.environment,
                    self.elapsed_secs()
                );
            }
            OutputMode::Quiet => println!("{}", status.artifact),
            OutputMode::Json => {
                self.json_out(&JsonEvent {
                    event: "finished",
                    stage: None,
                    message: None,
                    warnings: Vec::new(),
                    duration_secs: Some(self.elapsed_secs()),
                    status: Some(status),
                });
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    stage: None,
                    message: Some(message),
                    warnings: Vec::new(),
                    duration_secs: Some(self.elapsed_secs()),
                    status: None,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    fn json_out(&self, event: &JsonEvent<'_>) {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{json}");
        }
    }

    fn stage_elapsed(&self) -> f64 {
        self.stage_started
            .lock()
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ProgressSink for Output {
    fn emit(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::PipelineStarted {
                environment,
                image_tag,
            } => {
                self.progress(&format!(
                    "Deploying {image_tag} to environment {environment}"
                ));
            }
            ProgressEvent::StageStarted { stage } => {
                *self.stage_started.lock() = Some(Instant::now());
                match self.mode {
                    OutputMode::Normal => {
                        println!("Step {}: {}...", stage.number(), stage.title());
                    }
                    OutputMode::Quiet => {}
                    OutputMode::Json => self.json_out(&JsonEvent {
                        event: "stage_started",
                        stage: Some(*stage),
                        message: None,
                        warnings: Vec::new(),
                        duration_secs: None,
                        status: None,
                    }),
                }
            }
            ProgressEvent::StageFinished { stage, outcome } => {
                let elapsed = self.stage_elapsed();
                match self.mode {
                    OutputMode::Normal => match outcome {
                        StageOutcome::Succeeded => println!("  ✓ {} ({elapsed:.1}s)", stage.title()),
                        StageOutcome::Warned(warnings) => {
                            for warning in warnings {
                                println!("  ! {warning}");
                            }
                            println!("  ✓ {} ({elapsed:.1}s)", stage.title());
                        }
                        StageOutcome::Failed(reason) => {
                            eprintln!("  ✗ {}: {reason}", stage.title());
                        }
                        StageOutcome::Cancelled => {
                            eprintln!("  ✗ {}: cancelled", stage.title());
                        }
                    },
                    OutputMode::Quiet => {}
                    OutputMode::Json => {
                        let (event, message, warnings) = match outcome {
                            StageOutcome::Succeeded => ("stage_succeeded", None, Vec::new()),
                            StageOutcome::Warned(w) => {
                                ("stage_succeeded", None, w.iter().map(String::as_str).collect())
                            }
                            StageOutcome::Failed(reason) => {
                                ("stage_failed", Some(reason.as_str()), Vec::new())
                            }
                            StageOutcome::Cancelled => ("stage_cancelled", None, Vec::new()),
                        };
                        self.json_out(&JsonEvent {
                            event,
                            stage: Some(*stage),
                            message,
                            warnings,
                            duration_secs: Some(elapsed),
                            status: None,
                        });
                    }
                }
            }
            // The final summary and the error line are printed by the caller.
            ProgressEvent::PipelineSucceeded { .. } | ProgressEvent::PipelineFailed { .. } => {}
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a FinalStatus>,
}
