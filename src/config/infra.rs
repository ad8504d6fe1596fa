// ABOUTME: Provisioner settings: Terraform directory, state location and credentials.
// ABOUTME: Credentials are bound from the process environment at stage construction.

use super::EnvValue;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct InfraConfig {
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Directory holding the Terraform configuration.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Where applied state is written, relative to `dir`.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    #[serde(default = "default_credentials")]
    pub credentials: HashMap<String, EnvValue>,

    #[serde(default = "default_env")]
    pub env: HashMap<String, String>,
}

fn default_binary() -> String {
    "terraform".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from("terraform")
}

fn default_state_path() -> PathBuf {
    PathBuf::from("terraform.tfstate")
}

fn default_credentials() -> HashMap<String, EnvValue> {
    ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "AWS_SESSION_TOKEN"]
        .into_iter()
        .map(|var| (var.to_string(), EnvValue::inherited_or_empty(var)))
        .collect()
}

fn default_env() -> HashMap<String, String> {
    HashMap::from([("AWS_REGION".to_string(), "us-west-2".to_string())])
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            dir: default_dir(),
            state_path: default_state_path(),
            credentials: default_credentials(),
            env: default_env(),
        }
    }
}
