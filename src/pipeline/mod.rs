// ABOUTME: Deployment pipeline: stages, their results and the controller that sequences them.
// ABOUTME: Provision, build/publish, deploy and verify run strictly in that order.

mod build;
mod controller;
mod deploy;
mod error;
mod progress;
mod provision;
mod result;
mod stage;
mod state;
mod toolchain;

pub use build::build_and_publish;
pub use controller::{FinalStatus, PipelineController, PipelineStages, RunContext};
pub use deploy::{DeployPlan, deploy};
pub use error::{PipelineError, PipelineErrorKind, StageError};
pub use progress::{NullSink, ProgressEvent, ProgressSink, RecordingSink, StageOutcome};
pub use provision::provision;
pub use result::StageResult;
pub use stage::Stage;
pub use state::PipelinePhase;
pub use toolchain::{CACHE_BUST_VAR, ToolchainStages};
