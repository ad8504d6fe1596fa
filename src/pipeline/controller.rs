// ABOUTME: Pipeline controller: runs the four stages strictly in sequence.
// ABOUTME: Sole owner of abort-vs-continue decisions and of stage-boundary narration.

use super::{
    PipelineError, PipelinePhase, ProgressEvent, ProgressSink, Stage, StageOutcome, StageResult,
};
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::{ArtifactReference, Environment, ImageTag};
use crate::verify::ProductRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Inputs fixed for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub environment: Environment,
    pub image_tag: ImageTag,
}

/// The stage implementations a controller sequences.
///
/// Each stage consumes only the previous stage's output and never mutates it.
#[async_trait]
pub trait PipelineStages: Send + Sync {
    async fn provision(&self, ctx: &RunContext, cancel: &CancellationToken) -> StageResult<()>;

    async fn build(
        &self,
        ctx: &RunContext,
        cancel: &CancellationToken,
    ) -> StageResult<ArtifactReference>;

    async fn deploy(
        &self,
        ctx: &RunContext,
        artifact: &ArtifactReference,
        cancel: &CancellationToken,
    ) -> StageResult<()>;

    async fn verify(&self, ctx: &RunContext, cancel: &CancellationToken)
    -> StageResult<ProductRecord>;
}

#[async_trait]
impl<T: PipelineStages + ?Sized> PipelineStages for &T {
    async fn provision(&self, ctx: &RunContext, cancel: &CancellationToken) -> StageResult<()> {
        (**self).provision(ctx, cancel).await
    }

    async fn build(
        &self,
        ctx: &RunContext,
        cancel: &CancellationToken,
    ) -> StageResult<ArtifactReference> {
        (**self).build(ctx, cancel).await
    }

    async fn deploy(
        &self,
        ctx: &RunContext,
        artifact: &ArtifactReference,
        cancel: &CancellationToken,
    ) -> StageResult<()> {
        (**self).deploy(ctx, artifact, cancel).await
    }

    async fn verify(
        &self,
        ctx: &RunContext,
        cancel: &CancellationToken,
    ) -> StageResult<ProductRecord> {
        (**self).verify(ctx, cancel).await
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct FinalStatus {
    pub environment: String,
    pub artifact: String,
    pub product_id: Option<String>,
    pub warnings: Vec<Warning>,
    pub finished_at: DateTime<Utc>,
}

/// Runs provision → build → deploy → verify, stopping at the first hard failure.
///
/// Holds no per-run state, so concurrent runs only need separate controllers
/// when their stages differ.
pub struct PipelineController<S, P> {
    stages: S,
    sink: P,
}

impl<S: PipelineStages, P: ProgressSink> PipelineController<S, P> {
    pub fn new(stages: S, sink: P) -> Self {
        Self { stages, sink }
    }

    pub async fn run(
        &self,
        environment: Environment,
        image_tag: ImageTag,
        cancel: &CancellationToken,
    ) -> Result<FinalStatus, PipelineError> {
        let ctx = RunContext {
            environment,
            image_tag,
        };

        tracing::info!(environment = %ctx.environment, image_tag = %ctx.image_tag, "pipeline started");
        self.sink.emit(&ProgressEvent::PipelineStarted {
            environment: ctx.environment.clone(),
            image_tag: ctx.image_tag.clone(),
        });

        let mut run = Run {
            phase: PipelinePhase::NotStarted,
            diagnostics: Diagnostics::default(),
        };

        match self.execute(&ctx, &mut run, cancel).await {
            Ok((artifact, product)) => {
                self.sink.emit(&ProgressEvent::PipelineSucceeded {
                    environment: ctx.environment.clone(),
                    artifact: artifact.clone(),
                });
                tracing::info!(artifact = %artifact, "pipeline complete");
                Ok(FinalStatus {
                    environment: ctx.environment.to_string(),
                    artifact: artifact.to_string(),
                    product_id: product.identifier().map(str::to_string),
                    warnings: run.diagnostics.into_warnings(),
                    finished_at: Utc::now(),
                })
            }
            Err(err) => {
                tracing::error!(stage = %err.stage(), phase = %run.phase, "pipeline failed: {}", err);
                self.sink.emit(&ProgressEvent::PipelineFailed {
                    stage: err.stage(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        ctx: &RunContext,
        run: &mut Run,
        cancel: &CancellationToken,
    ) -> Result<(ArtifactReference, ProductRecord), PipelineError> {
        self.stage(Stage::Provision, run, cancel, self.stages.provision(ctx, cancel))
            .await?;

        let artifact = self
            .stage(Stage::Build, run, cancel, self.stages.build(ctx, cancel))
            .await?;

        self.stage(
            Stage::Deploy,
            run,
            cancel,
            self.stages.deploy(ctx, &artifact, cancel),
        )
        .await?;

        let product = self
            .stage(Stage::Verify, run, cancel, self.stages.verify(ctx, cancel))
            .await?;

        Ok((artifact, product))
    }

    /// Run one stage with its start/finish narration and phase bookkeeping.
    async fn stage<T, F>(
        &self,
        stage: Stage,
        run: &mut Run,
        cancel: &CancellationToken,
        work: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = StageResult<T>>,
    {
        // A stage never starts once the run is cancelled.
        if cancel.is_cancelled() {
            run.transition(PipelinePhase::Failed);
            return Err(PipelineError::Cancelled { stage });
        }

        run.transition(PipelinePhase::running(stage));
        tracing::info!(%stage, "stage started");
        self.sink.emit(&ProgressEvent::StageStarted { stage });

        match work.await {
            StageResult::Success(value) => {
                self.finish(stage, run, StageOutcome::Succeeded);
                Ok(value)
            }
            StageResult::Warning(value, warnings) => {
                let messages = warnings.iter().map(|w| w.message.clone()).collect();
                run.diagnostics.extend(warnings);
                self.finish(stage, run, StageOutcome::Warned(messages));
                Ok(value)
            }
            StageResult::HardFailure(source) => {
                let err = PipelineError::from_stage(stage, source);
                let outcome = match &err {
                    PipelineError::Cancelled { .. } => StageOutcome::Cancelled,
                    PipelineError::StageFailed { source, .. } => {
                        StageOutcome::Failed(source.to_string())
                    }
                };
                run.transition(PipelinePhase::Failed);
                tracing::info!(%stage, "stage failed");
                self.sink.emit(&ProgressEvent::StageFinished { stage, outcome });
                Err(err)
            }
        }
    }

    fn finish(&self, stage: Stage, run: &mut Run, outcome: StageOutcome) {
        let next = run.phase.succeeded();
        run.transition(next);
        tracing::info!(%stage, "stage finished");
        self.sink.emit(&ProgressEvent::StageFinished { stage, outcome });
    }
}

/// Mutable bookkeeping owned by a single run.
struct Run {
    phase: PipelinePhase,
    diagnostics: Diagnostics,
}

impl Run {
    fn transition(&mut self, next: PipelinePhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::debug!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }
}
