// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a deployline.yml template spelling out the defaults.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::WorkloadName;

use super::{CONFIG_FILENAME, Config, DEFAULT_BASE_URL};

pub fn init_config(dir: &Path, workload: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::default();

    if let Some(w) = workload {
        config.workload = WorkloadName::new(w).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let manifests: String = config
        .cluster
        .manifests
        .iter()
        .map(|m| format!("    - {}\n", m))
        .collect();

    format!(
        r#"workload: {workload}

infra:
  dir: {infra_dir}
  state_path: {state_path}
  env:
    AWS_REGION: us-west-2

image:
  registry: {registry}
  repository: {repository}
  context: {context}

cluster:
  manifest_dir: {manifest_dir}
  # Applied strictly in this order.
  manifests:
{manifests}  rollout_timeout: 120s

verify:
  base_url: "{base_url}"
  health:
    interval: 5s
    max_attempts: 24
"#,
        workload = config.workload,
        infra_dir = config.infra.dir.display(),
        state_path = config.infra.state_path.display(),
        registry = config.image.registry,
        repository = config.image.repository,
        context = config.image.context.display(),
        manifest_dir = config.cluster.manifest_dir.display(),
        manifests = manifests,
        base_url = DEFAULT_BASE_URL,
    )
}
