// ABOUTME: Pipeline configuration loaded from deployline.yml.
// ABOUTME: Every field has a default, so running without a file is supported.

mod cluster;
mod env_value;
mod image;
mod infra;
mod init;
mod verify;

pub use cluster::ClusterConfig;
pub use env_value::{EnvValue, bind_credentials};
pub use image::ImageConfig;
pub use infra::InfraConfig;
pub use init::init_config;
pub use verify::{DEFAULT_BASE_URL, VerifyConfig};

use crate::error::{Error, Result};
use crate::types::{ArtifactReference, Environment, ImageTag, WorkloadName};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "deployline.yml";
pub const CONFIG_FILENAME_ALT: &str = "deployline.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".deployline/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Primary workload: Deployment name, Service name and rollout target.
    #[serde(
        default = "default_workload",
        deserialize_with = "deserialize_workload_name"
    )]
    pub workload: WorkloadName,

    #[serde(default)]
    pub infra: InfraConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub verify: VerifyConfig,
}

fn default_workload() -> WorkloadName {
    WorkloadName::default()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workload: default_workload(),
            infra: InfraConfig::default(),
            image: ImageConfig::default(),
            cluster: ClusterConfig::default(),
            verify: VerifyConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Load an explicit file, or discover one in `dir`, falling back to defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => {
                tracing::debug!(dir = %dir.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Reject settings that would only fail halfway through a run.
    pub fn validate(&self) -> Result<()> {
        for (name, policy) in [
            ("verify.health", &self.verify.health),
            ("cluster.rollout", &self.cluster.rollout),
        ] {
            if policy.max_attempts == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{name}.max_attempts must be at least 1"
                )));
            }
        }

        if self.cluster.rollout_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "cluster.rollout_timeout must be greater than zero".to_string(),
            ));
        }

        let sample = self
            .verify
            .base_url_for(&self.workload, &Environment::default());
        if !sample.starts_with("http://") {
            return Err(Error::InvalidConfig(format!(
                "verify.base_url must be an http:// URL, got {sample}"
            )));
        }

        self.artifact_for(&ImageTag::default())?;
        Ok(())
    }

    /// Artifact reference the build stage publishes for `tag`.
    pub fn artifact_for(&self, tag: &ImageTag) -> Result<ArtifactReference> {
        ArtifactReference::new(&self.image.registry, &self.image.repository, tag)
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Container that receives the published image.
    pub fn container_name(&self) -> &str {
        self.cluster
            .container
            .as_deref()
            .unwrap_or(self.workload.as_str())
    }
}

fn deserialize_workload_name<'de, D>(deserializer: D) -> std::result::Result<WorkloadName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    WorkloadName::new(&s).map_err(serde::de::Error::custom)
}
