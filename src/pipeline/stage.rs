// ABOUTME: The four sequential pipeline stages.
// ABOUTME: Provision, build/publish, deploy and verify, in that fixed order.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Provision,
    Build,
    Deploy,
    Verify,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [Stage::Provision, Stage::Build, Stage::Deploy, Stage::Verify];

    /// One-based position in the pipeline.
    pub fn number(self) -> usize {
        match self {
            Stage::Provision => 1,
            Stage::Build => 2,
            Stage::Deploy => 3,
            Stage::Verify => 4,
        }
    }

    /// Human-readable heading for progress output.
    pub fn title(self) -> &'static str {
        match self {
            Stage::Provision => "Provision infrastructure",
            Stage::Build => "Build and publish image",
            Stage::Deploy => "Deploy to Kubernetes",
            Stage::Verify => "Functional API verification",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Provision => write!(f, "provision"),
            Stage::Build => write!(f, "build"),
            Stage::Deploy => write!(f, "deploy"),
            Stage::Verify => write!(f, "verify"),
        }
    }
}
