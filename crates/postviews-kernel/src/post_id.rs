//! Content-item identifiers.
//!
//! Sanity document ids are alphanumeric with hyphens and underscores (UUIDs
//! are 36 characters). Anything else is rejected before it can reach a store
//! query.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use crate::limits::MAX_POST_ID_LEN;

static POST_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[a-zA-Z0-9\-_]{{1,{MAX_POST_ID_LEN}}}$"))
        .expect("post id pattern is a valid regex")
});

/// Why a raw identifier was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PostIdError {
    #[error("post id is empty")]
    Empty,

    #[error("post id is {0} characters long, the maximum is {MAX_POST_ID_LEN}")]
    TooLong(usize),

    #[error("post id contains characters outside [A-Za-z0-9_-]")]
    InvalidCharacters,
}

/// A validated content-item identifier.
///
/// Constructed only through [`PostId::parse`], so holders may pass it to a
/// store without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Validate `raw` against `^[a-zA-Z0-9\-_]{1,200}$`.
    pub fn parse(raw: &str) -> Result<Self, PostIdError> {
        if raw.is_empty() {
            return Err(PostIdError::Empty);
        }
        let len = raw.chars().count();
        if len > MAX_POST_ID_LEN {
            return Err(PostIdError::TooLong(len));
        }
        if !POST_ID_PATTERN.is_match(raw) {
            return Err(PostIdError::InvalidCharacters);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for PostId {
    type Error = PostIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
