// ABOUTME: Ordered set of Kubernetes manifests applied during deploy.
// ABOUTME: Declaration order is a dependency order and is never rearranged.

use nonempty::NonEmpty;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestNameError {
    #[error("manifest name cannot be empty")]
    Empty,

    #[error("manifest name cannot contain whitespace: {0:?}")]
    Whitespace(String),
}

/// File name of a single manifest, relative to the manifest directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestName(String);

impl ManifestName {
    pub fn new(value: &str) -> Result<Self, ManifestNameError> {
        if value.is_empty() {
            return Err(ManifestNameError::Empty);
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ManifestNameError::Whitespace(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManifestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference deployment's manifests, in dependency order.
pub const DEFAULT_MANIFESTS: [&str; 5] = [
    "serviceaccount.yaml",
    "configmap.yaml",
    "deployment.yaml",
    "service.yaml",
    "hpa.yaml",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestSetError {
    #[error("manifest set cannot be empty")]
    Empty,

    #[error("manifest listed more than once: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Name(#[from] ManifestNameError),
}

/// Manifests in the exact order they must be applied.
///
/// A ServiceAccount has to exist before the Deployment that references it,
/// so iteration order is the declared order and there is no API to reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSet(NonEmpty<ManifestName>);

impl ManifestSet {
    pub fn new<I, S>(names: I) -> Result<Self, ManifestSetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| ManifestName::new(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ManifestSetError::Duplicate(name.to_string()));
            }
        }

        NonEmpty::from_vec(names)
            .map(Self)
            .ok_or(ManifestSetError::Empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first(&self) -> &ManifestName {
        self.0.first()
    }
}

impl Default for ManifestSet {
    /// ServiceAccount, ConfigMap, Deployment, Service, HorizontalPodAutoscaler.
    fn default() -> Self {
        let [head, tail @ ..] = DEFAULT_MANIFESTS;
        Self(NonEmpty {
            head: ManifestName(head.to_string()),
            tail: tail.iter().map(|n| ManifestName(n.to_string())).collect(),
        })
    }
}

impl<'de> Deserialize<'de> for ManifestSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names: Vec<String> = Vec::deserialize(deserializer)?;
        ManifestSet::new(names).map_err(serde::de::Error::custom)
    }
}
