//! Error types for Repotier core.

use std::{error::Error, fmt};

use crate::domain::Dimension;

/// Error type for Repotier core operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepotierError {
    /// A remote metadata fetch did not succeed.
    Fetch(String),
    /// README content could not be decoded as text.
    Decode(String),
    /// A profile vector was built from signals lacking a dimension.
    MissingDimension(Dimension),
    /// A repository URL could not be parsed into an owner and name.
    InvalidRepoUrl(String),
}

impl fmt::Display for RepotierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(message) => write!(f, "fetch failed: {message}"),
            Self::Decode(message) => write!(f, "decode failed: {message}"),
            Self::MissingDimension(dimension) => {
                write!(f, "missing signal dimension: {}", dimension.key())
            }
            Self::InvalidRepoUrl(url) => write!(f, "invalid repository url: {url}"),
        }
    }
}

impl Error for RepotierError {}

/// Convenience result type for Repotier core.
pub type Result<T> = std::result::Result<T, RepotierError>;
