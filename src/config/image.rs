// ABOUTME: Image build and publish settings.
// ABOUTME: Registry and repository combine with the run's tag into the artifact reference.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_binary")]
    pub binary: String,

    #[serde(default = "default_registry")]
    pub registry: String,

    #[serde(default = "default_repository")]
    pub repository: String,

    /// Build context (the application source tree).
    #[serde(default = "default_context")]
    pub context: PathBuf,
}

fn default_binary() -> String {
    "docker".to_string()
}

fn default_registry() -> String {
    "k3d-registry.localhost:5000".to_string()
}

fn default_repository() -> String {
    "imp-product-catalog".to_string()
}

fn default_context() -> PathBuf {
    PathBuf::from("app")
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            registry: default_registry(),
            repository: default_repository(),
            context: default_context(),
        }
    }
}
