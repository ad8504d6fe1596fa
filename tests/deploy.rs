// ABOUTME: Integration tests for the provision, build and deploy stages.
// ABOUTME: Uses a scripted executor to observe the exact command sequence.

mod support;

use deployline::diagnostics::WarningKind;
use deployline::pipeline::{
    DeployPlan, StageError, StageResult, build_and_publish, deploy, provision,
};
use deployline::poll::PollPolicy;
use deployline::tools::{ImageBuilder, Kubectl, Terraform};
use deployline::types::{ArtifactReference, Environment, ImageTag, ManifestSet, WorkloadName};
use std::collections::BTreeMap;
use std::time::Duration;
use support::scripted::ScriptedExecutor;
use tokio_util::sync::CancellationToken;

fn plan(manifests: &[&str]) -> DeployPlan {
    DeployPlan {
        kubectl: Kubectl::new("kubectl", "k8s", None),
        manifests: ManifestSet::new(manifests.iter().copied()).unwrap(),
        workload: WorkloadName::new("imp-product-catalog").unwrap(),
        container: "imp-product-catalog".to_string(),
        rollout_timeout: Duration::from_secs(120),
        rollout: PollPolicy::new(Duration::from_secs(5), 1),
    }
}

fn artifact() -> ArtifactReference {
    ArtifactReference::new(
        "k3d-registry.localhost:5000",
        "imp-product-catalog",
        &ImageTag::new("v1.2.3").unwrap(),
    )
    .unwrap()
}

fn env(name: &str) -> Environment {
    Environment::new(name).unwrap()
}

mod deploy_stage {
    use super::*;

    #[tokio::test]
    async fn runs_namespace_manifests_pin_and_rollout_in_order() {
        let executor = ScriptedExecutor::new();

        let result = deploy(
            &executor,
            &plan(&["a.yaml", "b.yaml"]),
            &env("staging"),
            &artifact(),
            &CancellationToken::new(),
        )
        .await;

        assert!(result.is_success());
        assert_eq!(
            executor.lines(),
            vec![
                "kubectl create namespace staging",
                "kubectl apply -f k8s/a.yaml -n staging",
                "kubectl apply -f k8s/b.yaml -n staging",
                "kubectl set image deployment/imp-product-catalog \
                 imp-product-catalog=k3d-registry.localhost:5000/imp-product-catalog:v1.2.3 \
                 -n staging",
                "kubectl rollout status deployment/imp-product-catalog -n staging --timeout=120s",
            ]
        );
    }

    #[tokio::test]
    async fn first_failed_manifest_stops_the_stage() {
        let executor = ScriptedExecutor::new().fail_on("b.yaml", "error validating data");

        let result = deploy(
            &executor,
            &plan(&["a.yaml", "b.yaml", "c.yaml"]),
            &env("dev"),
            &artifact(),
            &CancellationToken::new(),
        )
        .await;

        match result {
            StageResult::HardFailure(StageError::ManifestApply { manifest, .. }) => {
                assert_eq!(manifest.as_str(), "b.yaml");
            }
            other => panic!("expected manifest failure, got {other:?}"),
        }
        assert_eq!(executor.count_matching("kubectl apply"), 2);
        assert_eq!(executor.count_matching("c.yaml"), 0);
        assert_eq!(executor.count_matching("set image"), 0);
    }

    #[tokio::test]
    async fn existing_namespace_is_a_warning() {
        let executor = ScriptedExecutor::new().fail_on(
            "create namespace",
            "Error from server (AlreadyExists): namespaces \"dev\" already exists",
        );

        let result = deploy(
            &executor,
            &plan(&["a.yaml"]),
            &env("dev"),
            &artifact(),
            &CancellationToken::new(),
        )
        .await;

        assert!(result.is_warning());
        assert_eq!(result.warnings()[0].kind, WarningKind::BenignDuplicate);
        assert_eq!(executor.count_matching("kubectl apply"), 1);
    }

    #[tokio::test]
    async fn unconfirmed_rollout_is_a_warning() {
        let executor = ScriptedExecutor::new().fail_on("rollout status", "timed out waiting");

        let result = deploy(
            &executor,
            &plan(&["a.yaml"]),
            &env("dev"),
            &artifact(),
            &CancellationToken::new(),
        )
        .await;

        assert!(result.is_warning());
        assert_eq!(result.warnings()[0].kind, WarningKind::RolloutUnconfirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn rollout_is_retried_per_policy() {
        let executor = ScriptedExecutor::new().fail_times("rollout status", 2, "not yet");
        let mut plan = plan(&["a.yaml"]);
        plan.rollout = PollPolicy::new(Duration::from_secs(5), 3);

        let result = deploy(
            &executor,
            &plan,
            &env("dev"),
            &artifact(),
            &CancellationToken::new(),
        )
        .await;

        assert!(result.is_success());
        assert_eq!(executor.count_matching("rollout status"), 3);
    }

    #[tokio::test]
    async fn failed_image_pin_is_fatal() {
        let executor = ScriptedExecutor::new().fail_on("set image", "deployments.apps not found");

        let result = deploy(
            &executor,
            &plan(&["a.yaml"]),
            &env("dev"),
            &artifact(),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result.error(), Some(StageError::Step { .. })));
        assert_eq!(executor.count_matching("rollout status"), 0);
    }
}

mod provision_stage {
    use super::*;

    fn terraform() -> Terraform {
        Terraform::new(
            "terraform",
            "terraform",
            "terraform.tfstate",
            BTreeMap::from([("AWS_REGION".to_string(), "us-west-2".to_string())]),
        )
    }

    #[tokio::test]
    async fn runs_init_then_apply() {
        let executor = ScriptedExecutor::new();

        let result = provision(&executor, &terraform(), &CancellationToken::new()).await;

        assert!(result.is_success());
        assert_eq!(
            executor.lines(),
            vec![
                "terraform init -input=false",
                "terraform apply -auto-approve -input=false -state=terraform.tfstate",
            ]
        );
        let calls = executor.calls();
        assert_eq!(
            calls[1].get_env().get("AWS_REGION").map(String::as_str),
            Some("us-west-2")
        );
    }

    #[tokio::test]
    async fn failed_init_skips_apply() {
        let executor = ScriptedExecutor::new().fail_on("init", "backend unreachable");

        let result = provision(&executor, &terraform(), &CancellationToken::new()).await;

        assert!(result.is_hard_failure());
        assert_eq!(executor.calls().len(), 1);
    }
}

mod build_stage {
    use super::*;

    #[tokio::test]
    async fn builds_then_pushes_the_same_reference() {
        let executor = ScriptedExecutor::new();
        let builder = ImageBuilder::new("docker", "app");

        let result =
            build_and_publish(&executor, &builder, artifact(), &CancellationToken::new()).await;

        assert_eq!(result.into_parts().unwrap().0, artifact());
        assert_eq!(
            executor.lines(),
            vec![
                "docker build -t k3d-registry.localhost:5000/imp-product-catalog:v1.2.3 app",
                "docker push k3d-registry.localhost:5000/imp-product-catalog:v1.2.3",
            ]
        );
    }

    #[tokio::test]
    async fn failed_build_skips_push() {
        let executor = ScriptedExecutor::new().fail_on("docker build", "no such file");
        let builder = ImageBuilder::new("docker", "app");

        let result =
            build_and_publish(&executor, &builder, artifact(), &CancellationToken::new()).await;

        assert!(result.is_hard_failure());
        assert_eq!(executor.count_matching("docker push"), 0);
    }
}
