// ABOUTME: Validated domain types shared by every pipeline stage.
// ABOUTME: Values are checked once at construction and immutable afterwards.

mod artifact_ref;
mod environment;
mod image_tag;
mod manifest;
mod workload_name;

pub use artifact_ref::{ArtifactReference, ParseArtifactRefError};
pub use environment::{DEFAULT_ENVIRONMENT, Environment, EnvironmentError};
pub use image_tag::{DEFAULT_IMAGE_TAG, ImageTag, ImageTagError};
pub use manifest::{
    DEFAULT_MANIFESTS, ManifestName, ManifestNameError, ManifestSet, ManifestSetError,
};
pub use workload_name::{DEFAULT_WORKLOAD, WorkloadName, WorkloadNameError};

/// Check a string against RFC 1123 label rules, returning the first violation.
pub(crate) fn check_dns_label(value: &str) -> Result<(), DnsLabelViolation> {
    if value.is_empty() {
        return Err(DnsLabelViolation::Empty);
    }

    if value.len() > 63 {
        return Err(DnsLabelViolation::TooLong);
    }

    if value.starts_with('-') {
        return Err(DnsLabelViolation::StartsWithHyphen);
    }

    if value.ends_with('-') {
        return Err(DnsLabelViolation::EndsWithHyphen);
    }

    for c in value.chars() {
        if c.is_ascii_uppercase() {
            return Err(DnsLabelViolation::NotLowercase);
        }
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
            return Err(DnsLabelViolation::InvalidChar(c));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DnsLabelViolation {
    Empty,
    TooLong,
    StartsWithHyphen,
    EndsWithHyphen,
    NotLowercase,
    InvalidChar(char),
}
