// ABOUTME: Deploy stage: namespace, ordered manifests, image pin, rollout wait.
// ABOUTME: Only namespace creation may fail benignly; the first failed manifest aborts.

use super::{StageError, StageResult};
use crate::apply::{AllowListed, IdempotentApplier};
use crate::diagnostics::Warning;
use crate::exec::StepExecutor;
use crate::poll::{CommandProbe, PollOutcome, PollPolicy, ReadinessPoller};
use crate::tools::Kubectl;
use crate::types::{ArtifactReference, Environment, ManifestSet, WorkloadName};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Everything the deploy stage needs besides the run's inputs.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub kubectl: Kubectl,
    pub manifests: ManifestSet,
    pub workload: WorkloadName,
    pub container: String,
    pub rollout_timeout: Duration,
    pub rollout: PollPolicy,
}

pub async fn deploy<E: StepExecutor>(
    executor: &E,
    plan: &DeployPlan,
    environment: &Environment,
    artifact: &ArtifactReference,
    cancel: &CancellationToken,
) -> StageResult<()> {
    let namespace = environment.namespace();
    let mut warnings = Vec::new();

    let applier = IdempotentApplier::new(executor, AllowListed);
    match applier
        .apply_idempotent(&plan.kubectl.create_namespace(namespace), cancel)
        .await
    {
        StageResult::Success(()) => {}
        StageResult::Warning((), w) => warnings.extend(w),
        StageResult::HardFailure(e) => return StageResult::HardFailure(e),
    }

    for manifest in plan.manifests.iter() {
        tracing::info!(%manifest, namespace, "applying manifest");
        let spec = plan.kubectl.apply(manifest, namespace);
        if let Err(source) = executor.execute(&spec, cancel).await {
            return StageResult::HardFailure(StageError::ManifestApply {
                manifest: manifest.clone(),
                source,
            });
        }
    }

    let pin = plan
        .kubectl
        .set_image(&plan.workload, &plan.container, artifact, namespace);
    if let Err(source) = executor.execute(&pin, cancel).await {
        return StageResult::HardFailure(StageError::Step {
            step: pin.to_string(),
            source,
        });
    }

    let probe = CommandProbe::new(
        executor,
        plan.kubectl
            .rollout_status(&plan.workload, namespace, plan.rollout_timeout),
    );
    match ReadinessPoller::new(plan.rollout).poll(&probe, cancel).await {
        PollOutcome::Ready { .. } => {
            tracing::info!(workload = %plan.workload, namespace, "rollout complete");
        }
        PollOutcome::Cancelled { .. } => return StageResult::HardFailure(StageError::Cancelled),
        // Not escalated: verification fails if the workload never serves.
        PollOutcome::TimedOut {
            attempts,
            last_error,
            ..
        } => warnings.push(Warning::rollout_unconfirmed(format!(
            "rollout of deployment/{} in {} not confirmed after {} attempt(s){}",
            plan.workload,
            namespace,
            attempts,
            last_error.map(|e| format!(": {}", e)).unwrap_or_default()
        ))),
    }

    StageResult::with_warnings((), warnings)
}
