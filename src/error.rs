// ABOUTME: Application-wide error types for deployline.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::pipeline::{PipelineError, PipelineErrorKind};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl Error {
    /// Process exit status: 130 for an operator abort, 1 for anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Pipeline(e) if e.kind() == PipelineErrorKind::Cancelled => 130,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
