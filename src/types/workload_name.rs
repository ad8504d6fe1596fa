// ABOUTME: Name of the primary Kubernetes workload (Deployment and Service).
// ABOUTME: Must be a valid RFC 1123 label because it appears in service DNS names.

use super::{DnsLabelViolation, check_dns_label};
use std::fmt;
use thiserror::Error;

/// Workload of the reference product-catalog deployment.
pub const DEFAULT_WORKLOAD: &str = "imp-product-catalog";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkloadNameError {
    #[error("workload name cannot be empty")]
    Empty,

    #[error("workload name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("workload name cannot start or end with a hyphen")]
    Hyphen,

    #[error("workload name must be lowercase")]
    NotLowercase,

    #[error("invalid character in workload name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkloadName(String);

impl WorkloadName {
    pub fn new(value: &str) -> Result<Self, WorkloadNameError> {
        check_dns_label(value).map_err(|v| match v {
            DnsLabelViolation::Empty => WorkloadNameError::Empty,
            DnsLabelViolation::TooLong => WorkloadNameError::TooLong,
            DnsLabelViolation::StartsWithHyphen | DnsLabelViolation::EndsWithHyphen => {
                WorkloadNameError::Hyphen
            }
            DnsLabelViolation::NotLowercase => WorkloadNameError::NotLowercase,
            DnsLabelViolation::InvalidChar(c) => WorkloadNameError::InvalidChar(c),
        })?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkloadName {
    fn default() -> Self {
        Self(DEFAULT_WORKLOAD.to_string())
    }
}

impl fmt::Display for WorkloadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
