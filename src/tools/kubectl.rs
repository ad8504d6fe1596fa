// ABOUTME: kubectl invocations for the deploy stage, all addressed by namespace.
// ABOUTME: Covers namespace creation, manifest apply, image pinning and rollout status.

use crate::exec::CommandSpec;
use crate::types::{ArtifactReference, ManifestName, WorkloadName};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: String,
    manifest_dir: PathBuf,
    kubeconfig: Option<PathBuf>,
}

impl Kubectl {
    pub fn new(
        binary: impl Into<String>,
        manifest_dir: impl Into<PathBuf>,
        kubeconfig: Option<PathBuf>,
    ) -> Self {
        Self {
            binary: binary.into(),
            manifest_dir: manifest_dir.into(),
            kubeconfig,
        }
    }

    fn base(&self) -> CommandSpec {
        let spec = CommandSpec::new(self.binary.as_str());
        match &self.kubeconfig {
            Some(path) => spec.env("KUBECONFIG", path.display().to_string()),
            None => spec,
        }
    }

    pub fn create_namespace(&self, namespace: &str) -> CommandSpec {
        self.base().args(["create", "namespace", namespace])
    }

    pub fn apply(&self, manifest: &ManifestName, namespace: &str) -> CommandSpec {
        let path = self.manifest_dir.join(manifest.as_str());
        self.base().args([
            "apply".to_string(),
            "-f".to_string(),
            path.display().to_string(),
            "-n".to_string(),
            namespace.to_string(),
        ])
    }

    pub fn set_image(
        &self,
        workload: &WorkloadName,
        container: &str,
        artifact: &ArtifactReference,
        namespace: &str,
    ) -> CommandSpec {
        self.base().args([
            "set".to_string(),
            "image".to_string(),
            format!("deployment/{}", workload),
            format!("{}={}", container, artifact),
            "-n".to_string(),
            namespace.to_string(),
        ])
    }

    pub fn rollout_status(
        &self,
        workload: &WorkloadName,
        namespace: &str,
        timeout: Duration,
    ) -> CommandSpec {
        self.base().args([
            "rollout".to_string(),
            "status".to_string(),
            format!("deployment/{}", workload),
            "-n".to_string(),
            namespace.to_string(),
            format!("--timeout={}s", timeout_secs(timeout)),
        ])
    }
}

/// Whole seconds, rounded up. kubectl reads `0s` as "wait forever".
fn timeout_secs(timeout: Duration) -> u64 {
    let secs = timeout.as_secs();
    if timeout.subsec_nanos() > 0 { secs + 1 } else { secs }
}
