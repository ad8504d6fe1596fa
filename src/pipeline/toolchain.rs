// ABOUTME: Stage implementations backed by terraform, the image builder and kubectl.
// ABOUTME: Built once from configuration; credentials are bound at construction time.

use super::{
    DeployPlan, PipelineStages, RunContext, StageResult, build_and_publish, deploy, provision,
};
use crate::config::{Config, VerifyConfig, bind_credentials};
use crate::error::Result;
use crate::exec::{CommandSpec, StepExecutor};
use crate::tools::{ImageBuilder, Kubectl, Terraform};
use crate::types::{ArtifactReference, ParseArtifactRefError, WorkloadName};
use crate::verify::{ApiClient, FunctionalVerifier, ProductRecord};
use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Forces the provisioner to re-evaluate its data sources on every run.
pub const CACHE_BUST_VAR: &str = "TF_CACHE_BUST";

pub struct ToolchainStages<E, C> {
    executor: E,
    terraform: Terraform,
    builder: ImageBuilder,
    registry: String,
    repository: String,
    plan: DeployPlan,
    verifier: FunctionalVerifier<C>,
    verify: VerifyConfig,
    workload: WorkloadName,
}

impl<E: StepExecutor, C: ApiClient> ToolchainStages<E, C> {
    pub fn from_config(config: &Config, executor: E, client: C) -> Result<Self> {
        let mut env = bind_credentials(&config.infra.credentials)?;
        env.extend(
            config
                .infra
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        env.insert(CACHE_BUST_VAR.to_string(), Utc::now().to_rfc3339());

        let terraform = Terraform::new(
            config.infra.binary.as_str(),
            config.infra.dir.clone(),
            config.infra.state_path.clone(),
            env,
        );

        let builder = ImageBuilder::new(config.image.binary.as_str(), config.image.context.clone());

        let plan = DeployPlan {
            kubectl: Kubectl::new(
                config.cluster.binary.as_str(),
                config.cluster.manifest_dir.clone(),
                config.cluster.kubeconfig.clone(),
            ),
            manifests: config.cluster.manifests.clone(),
            workload: config.workload.clone(),
            container: config.container_name().to_string(),
            rollout_timeout: config.cluster.rollout_timeout,
            rollout: config.cluster.rollout,
        };

        let verifier =
            FunctionalVerifier::new(client, config.verify.health, config.verify.product.clone());

        Ok(Self {
            executor,
            terraform,
            builder,
            registry: config.image.registry.clone(),
            repository: config.image.repository.clone(),
            plan,
            verifier,
            verify: config.verify.clone(),
            workload: config.workload.clone(),
        })
    }

    fn artifact(&self, ctx: &RunContext) -> std::result::Result<ArtifactReference, ParseArtifactRefError> {
        ArtifactReference::new(&self.registry, &self.repository, &ctx.image_tag)
    }

    /// Service root the verifier targets for this run.
    pub fn base_url(&self, ctx: &RunContext) -> String {
        self.verify.base_url_for(&self.workload, &ctx.environment)
    }

    /// Every external command a run would execute, in order, without running any.
    pub fn planned_commands(
        &self,
        ctx: &RunContext,
    ) -> std::result::Result<Vec<CommandSpec>, ParseArtifactRefError> {
        let artifact = self.artifact(ctx)?;
        let namespace = ctx.environment.namespace();
        let kubectl = &self.plan.kubectl;

        let mut commands = vec![
            self.terraform.init(),
            self.terraform.apply(),
            self.builder.build(&artifact),
            self.builder.push(&artifact),
            kubectl.create_namespace(namespace),
        ];
        commands.extend(
            self.plan
                .manifests
                .iter()
                .map(|manifest| kubectl.apply(manifest, namespace)),
        );
        commands.push(kubectl.set_image(
            &self.plan.workload,
            &self.plan.container,
            &artifact,
            namespace,
        ));
        commands.push(kubectl.rollout_status(
            &self.plan.workload,
            namespace,
            self.plan.rollout_timeout,
        ));
        Ok(commands)
    }
}

#[async_trait]
impl<E: StepExecutor, C: ApiClient> PipelineStages for ToolchainStages<E, C> {
    async fn provision(&self, _ctx: &RunContext, cancel: &CancellationToken) -> StageResult<()> {
        provision(&self.executor, &self.terraform, cancel).await
    }

    async fn build(
        &self,
        ctx: &RunContext,
        cancel: &CancellationToken,
    ) -> StageResult<ArtifactReference> {
        match self.artifact(ctx) {
            Ok(artifact) => build_and_publish(&self.executor, &self.builder, artifact, cancel).await,
            Err(e) => StageResult::HardFailure(e.into()),
        }
    }

    async fn deploy(
        &self,
        ctx: &RunContext,
        artifact: &ArtifactReference,
        cancel: &CancellationToken,
    ) -> StageResult<()> {
        deploy(&self.executor, &self.plan, &ctx.environment, artifact, cancel).await
    }

    async fn verify(
        &self,
        ctx: &RunContext,
        cancel: &CancellationToken,
    ) -> StageResult<ProductRecord> {
        let base_url = self.base_url(ctx);
        tracing::info!(%base_url, "verifying deployed API");
        self.verifier.verify(&base_url, cancel).await
    }
}
