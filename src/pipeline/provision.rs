// ABOUTME: Provision stage: initialize and apply the infrastructure description.
// ABOUTME: Both steps are hard; provisioner output is not interpreted.

use super::{StageError, StageResult};
use crate::exec::StepExecutor;
use crate::tools::Terraform;
use tokio_util::sync::CancellationToken;

pub async fn provision<E: StepExecutor>(
    executor: &E,
    terraform: &Terraform,
    cancel: &CancellationToken,
) -> StageResult<()> {
    for spec in [terraform.init(), terraform.apply()] {
        tracing::info!(command = %spec, "provisioning");
        if let Err(source) = executor.execute(&spec, cancel).await {
            return StageResult::HardFailure(StageError::Step {
                step: spec.to_string(),
                source,
            });
        }
    }
    StageResult::Success(())
}
