// ABOUTME: Reference to a published container image: registry/repository:tag.
// ABOUTME: Produced by the build stage and consumed read-only by deploy.

use super::ImageTag;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseArtifactRefError {
    #[error("artifact reference cannot be empty")]
    Empty,

    #[error("invalid character in artifact reference: {0}")]
    InvalidChar(char),

    #[error("artifact reference is missing a registry: {0}")]
    MissingRegistry(String),

    #[error("artifact reference is missing a tag: {0}")]
    MissingTag(String),

    #[error("invalid tag in artifact reference: {0}")]
    InvalidTag(String),
}

/// A published, deployable image.
///
/// Unlike a pull reference, every component is mandatory: the pipeline always
/// publishes to an explicit registry under an explicit tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactReference {
    registry: String,
    repository: String,
    tag: ImageTag,
}

impl ArtifactReference {
    pub fn new(
        registry: &str,
        repository: &str,
        tag: &ImageTag,
    ) -> Result<Self, ParseArtifactRefError> {
        Self::check_chars(registry)?;
        Self::check_chars(repository)?;

        if registry.is_empty() {
            return Err(ParseArtifactRefError::MissingRegistry(repository.to_string()));
        }
        if repository.is_empty() {
            return Err(ParseArtifactRefError::Empty);
        }

        Ok(Self {
            registry: registry.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            tag: tag.clone(),
        })
    }

    pub fn parse(input: &str) -> Result<Self, ParseArtifactRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseArtifactRefError::Empty);
        }
        Self::check_chars(input)?;

        // The registry is everything before the first slash; a port colon
        // lives there, so the tag is split from the last path segment only.
        let (registry, rest) = input
            .split_once('/')
            .ok_or_else(|| ParseArtifactRefError::MissingRegistry(input.to_string()))?;

        let (repository, tag) = rest
            .rsplit_once(':')
            .ok_or_else(|| ParseArtifactRefError::MissingTag(input.to_string()))?;

        let tag =
            ImageTag::new(tag).map_err(|e| ParseArtifactRefError::InvalidTag(e.to_string()))?;

        Self::new(registry, repository, &tag)
    }

    fn check_chars(input: &str) -> Result<(), ParseArtifactRefError> {
        for c in input.chars() {
            if !c.is_ascii_alphanumeric()
                && c != '/'
                && c != ':'
                && c != '.'
                && c != '-'
                && c != '_'
            {
                return Err(ParseArtifactRefError::InvalidChar(c));
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &ImageTag {
        &self.tag
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.registry, self.repository, self.tag)
    }
}
