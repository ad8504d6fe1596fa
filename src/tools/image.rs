// ABOUTME: Container image build and push invocations.
// ABOUTME: The artifact reference is both the build tag and the push target.

use crate::exec::CommandSpec;
use crate::types::ArtifactReference;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ImageBuilder {
    binary: String,
    context: PathBuf,
}

impl ImageBuilder {
    pub fn new(binary: impl Into<String>, context: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            context: context.into(),
        }
    }

    pub fn build(&self, artifact: &ArtifactReference) -> CommandSpec {
        CommandSpec::new(self.binary.as_str()).args([
            "build".to_string(),
            "-t".to_string(),
            artifact.to_string(),
            self.context.display().to_string(),
        ])
    }

    pub fn push(&self, artifact: &ArtifactReference) -> CommandSpec {
        CommandSpec::new(self.binary.as_str()).args(["push".to_string(), artifact.to_string()])
    }
}
