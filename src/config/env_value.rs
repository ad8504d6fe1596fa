// ABOUTME: Credential bindings handed to the provisioner's process environment.
// ABOUTME: A binding is a fixed string or is inherited from this process's environment.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// One provisioner environment binding as written in `infra.credentials`.
///
/// ```yaml
/// AWS_REGION: us-west-2             # fixed
/// AWS_ACCESS_KEY_ID:                # inherited
///   env: CI_AWS_ACCESS_KEY_ID
///   default: ""
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    Inherited {
        #[serde(rename = "env")]
        name: String,
        /// Used when `name` is unset. Without one, an unset variable is an error.
        #[serde(rename = "default", default)]
        fallback: Option<String>,
    },
}

impl EnvValue {
    /// Inherit `name`, binding an empty string when it is unset.
    pub fn inherited_or_empty(name: &str) -> Self {
        EnvValue::Inherited {
            name: name.to_string(),
            fallback: Some(String::new()),
        }
    }

    /// The value this binding has right now.
    pub fn bind(&self) -> Result<String> {
        match self {
            EnvValue::Literal(value) => Ok(value.clone()),
            EnvValue::Inherited { name, fallback } => std::env::var(name)
                .ok()
                .or_else(|| fallback.clone())
                .ok_or_else(|| Error::MissingEnvVar(name.clone())),
        }
    }
}

/// Bind every credential, stopping at the first inherited variable that is unset
/// and has no fallback. The result is ordered by key.
pub fn bind_credentials(
    bindings: &HashMap<String, EnvValue>,
) -> Result<BTreeMap<String, String>> {
    let mut bound = BTreeMap::new();
    for (key, binding) in bindings {
        bound.insert(key.clone(), binding.bind()?);
    }
    Ok(bound)
}
