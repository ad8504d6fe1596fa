// ABOUTME: Container image tag supplied by the caller (e.g. v1.0.0).
// ABOUTME: Enforces the registry tag grammar: [A-Za-z0-9_][A-Za-z0-9_.-]{0,127}.

use std::fmt;
use thiserror::Error;

/// Tag used when neither a flag nor `IMAGE_TAG` is given.
pub const DEFAULT_IMAGE_TAG: &str = "v1.0.0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageTagError {
    #[error("image tag cannot be empty")]
    Empty,

    #[error("image tag exceeds maximum length of 128 characters")]
    TooLong,

    #[error("image tag cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in image tag: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTag(String);

impl ImageTag {
    pub fn new(value: &str) -> Result<Self, ImageTagError> {
        let mut chars = value.chars();
        let first = chars.next().ok_or(ImageTagError::Empty)?;

        if value.len() > 128 {
            return Err(ImageTagError::TooLong);
        }

        if first == '.' || first == '-' {
            return Err(ImageTagError::InvalidStart(first));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != '-' {
                return Err(ImageTagError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ImageTag {
    fn default() -> Self {
        Self(DEFAULT_IMAGE_TAG.to_string())
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ImageTag {
    type Err = ImageTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
