// ABOUTME: Cluster control-plane settings: manifests, their order and rollout waiting.
// ABOUTME: The manifest list order is the apply order.

use crate::poll::PollPolicy;
use crate::types::ManifestSet;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_binary")]
    pub binary: String,

    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,

    #[serde(default = "default_manifests")]
    pub manifests: ManifestSet,

    /// Container in the workload that receives the published image.
    /// Defaults to the workload name.
    #[serde(default)]
    pub container: Option<String>,

    /// Timeout handed to `kubectl rollout status`.
    #[serde(default = "default_rollout_timeout", with = "humantime_serde")]
    pub rollout_timeout: Duration,

    #[serde(default = "default_rollout_poll")]
    pub rollout: PollPolicy,
}

fn default_binary() -> String {
    "kubectl".to_string()
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from("k8s")
}

fn default_manifests() -> ManifestSet {
    ManifestSet::default()
}

fn default_rollout_timeout() -> Duration {
    Duration::from_secs(120)
}

/// kubectl does its own waiting, so one attempt is the default.
fn default_rollout_poll() -> PollPolicy {
    PollPolicy::new(Duration::from_secs(5), 1)
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            kubeconfig: None,
            manifest_dir: default_manifest_dir(),
            manifests: default_manifests(),
            container: None,
            rollout_timeout: default_rollout_timeout(),
            rollout: default_rollout_poll(),
        }
    }
}
