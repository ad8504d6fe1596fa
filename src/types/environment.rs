// ABOUTME: Deployment environment identifier (dev, staging, ...).
// ABOUTME: Doubles as the Kubernetes namespace, so it follows RFC 1123 label rules.

use super::{DnsLabelViolation, check_dns_label};
use std::fmt;
use thiserror::Error;

/// Environment used when neither a flag nor `ENVIRONMENT` is given.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("environment name cannot be empty")]
    Empty,

    #[error("environment name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("environment name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("environment name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("environment name must be lowercase")]
    NotLowercase,

    #[error("invalid character in environment name: '{0}'")]
    InvalidChar(char),
}

impl From<DnsLabelViolation> for EnvironmentError {
    fn from(v: DnsLabelViolation) -> Self {
        match v {
            DnsLabelViolation::Empty => EnvironmentError::Empty,
            DnsLabelViolation::TooLong => EnvironmentError::TooLong,
            DnsLabelViolation::StartsWithHyphen => EnvironmentError::StartsWithHyphen,
            DnsLabelViolation::EndsWithHyphen => EnvironmentError::EndsWithHyphen,
            DnsLabelViolation::NotLowercase => EnvironmentError::NotLowercase,
            DnsLabelViolation::InvalidChar(c) => EnvironmentError::InvalidChar(c),
        }
    }
}

/// A validated environment name.
///
/// The same value parameterizes the target namespace, the in-cluster service
/// DNS name and the progress narration, so it is validated once and never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Environment(String);

impl Environment {
    pub fn new(value: &str) -> Result<Self, EnvironmentError> {
        check_dns_label(value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace the environment's workloads live in.
    pub fn namespace(&self) -> &str {
        &self.0
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self(DEFAULT_ENVIRONMENT.to_string())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Environment {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
