// ABOUTME: Terraform invocations for the provision stage.
// ABOUTME: init then apply, with credentials bound into the process environment.

use crate::exec::CommandSpec;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Terraform {
    binary: String,
    dir: PathBuf,
    state_path: PathBuf,
    env: BTreeMap<String, String>,
}

impl Terraform {
    pub fn new(
        binary: impl Into<String>,
        dir: impl Into<PathBuf>,
        state_path: impl Into<PathBuf>,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            binary: binary.into(),
            dir: dir.into(),
            state_path: state_path.into(),
            env,
        }
    }

    fn base(&self) -> CommandSpec {
        CommandSpec::new(self.binary.as_str())
            .current_dir(self.dir.clone())
            .envs(self.env.clone())
            .env("TF_IN_AUTOMATION", "1")
    }

    pub fn init(&self) -> CommandSpec {
        self.base().args(["init", "-input=false"])
    }

    pub fn apply(&self) -> CommandSpec {
        self.base().args([
            "apply".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
            format!("-state={}", self.state_path.display()),
        ])
    }
}
