// ABOUTME: Step execution: run one fully-resolved external command.
// ABOUTME: Executors report failures verbatim and never retry.

mod command;
mod executor;

pub use command::CommandSpec;
pub use executor::{ExecError, ProcessExecutor, StepExecutor, StepOutput};
