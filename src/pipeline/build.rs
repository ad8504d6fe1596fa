// ABOUTME: Build/publish stage: build the image and push it to the registry.
// ABOUTME: Yields the artifact reference the deploy stage pins the workload to.

use super::{StageError, StageResult};
use crate::exec::StepExecutor;
use crate::tools::ImageBuilder;
use crate::types::ArtifactReference;
use tokio_util::sync::CancellationToken;

pub async fn build_and_publish<E: StepExecutor>(
    executor: &E,
    builder: &ImageBuilder,
    artifact: ArtifactReference,
    cancel: &CancellationToken,
) -> StageResult<ArtifactReference> {
    for spec in [builder.build(&artifact), builder.push(&artifact)] {
        tracing::info!(command = %spec, "publishing {}", artifact);
        if let Err(source) = executor.execute(&spec, cancel).await {
            return StageResult::HardFailure(StageError::Step {
                step: spec.to_string(),
                source,
            });
        }
    }
    StageResult::Success(artifact)
}
