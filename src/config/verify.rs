// ABOUTME: Functional verification settings: service URL, health polling, test payload.
// ABOUTME: The base URL is a template over the workload and environment names.

use crate::poll::PollPolicy;
use crate::types::{Environment, WorkloadName};
use crate::verify::NewProduct;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://{workload}.{environment}.svc.cluster.local:80";

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub health: PollPolicy,

    /// Per-request timeout for create, fetch and delete calls.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    #[serde(default)]
    pub product: NewProduct,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

impl VerifyConfig {
    /// Substitute `{workload}` and `{environment}` into the base URL template.
    pub fn base_url_for(&self, workload: &WorkloadName, environment: &Environment) -> String {
        self.base_url
            .replace("{workload}", workload.as_str())
            .replace("{environment}", environment.as_str())
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health: PollPolicy::default(),
            request_timeout: default_request_timeout(),
            product: NewProduct::default(),
        }
    }
}
