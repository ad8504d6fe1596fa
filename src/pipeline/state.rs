// ABOUTME: Pipeline phase state machine.
// ABOUTME: Phases advance strictly in stage order; Done and Failed are terminal.

use super::Stage;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    NotStarted,
    Provisioning,
    Building,
    Deploying,
    Verifying,
    Done,
    Failed,
}

impl PipelinePhase {
    /// The phase in which `stage` runs.
    pub fn running(stage: Stage) -> Self {
        match stage {
            Stage::Provision => PipelinePhase::Provisioning,
            Stage::Build => PipelinePhase::Building,
            Stage::Deploy => PipelinePhase::Deploying,
            Stage::Verify => PipelinePhase::Verifying,
        }
    }

    /// The stage running in this phase, if any.
    pub fn stage(self) -> Option<Stage> {
        match self {
            PipelinePhase::Provisioning => Some(Stage::Provision),
            PipelinePhase::Building => Some(Stage::Build),
            PipelinePhase::Deploying => Some(Stage::Deploy),
            PipelinePhase::Verifying => Some(Stage::Verify),
            PipelinePhase::NotStarted | PipelinePhase::Done | PipelinePhase::Failed => None,
        }
    }

    /// Phase entered when the current stage completes without a hard failure.
    pub fn succeeded(self) -> Self {
        match self {
            PipelinePhase::NotStarted => PipelinePhase::Provisioning,
            PipelinePhase::Provisioning => PipelinePhase::Building,
            PipelinePhase::Building => PipelinePhase::Deploying,
            PipelinePhase::Deploying => PipelinePhase::Verifying,
            PipelinePhase::Verifying | PipelinePhase::Done => PipelinePhase::Done,
            PipelinePhase::Failed => PipelinePhase::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelinePhase::Done | PipelinePhase::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: PipelinePhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        // A run cancelled before provisioning fails without running a stage.
        if next == PipelinePhase::Failed {
            return true;
        }
        self.succeeded() == next
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelinePhase::NotStarted => "not started",
            PipelinePhase::Provisioning => "provisioning",
            PipelinePhase::Building => "building",
            PipelinePhase::Deploying => "deploying",
            PipelinePhase::Verifying => "verifying",
            PipelinePhase::Done => "done",
            PipelinePhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
