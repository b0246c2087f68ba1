//! Error types for the planner and its adapters.

use thiserror::Error;

/// Failure of a single directions request.
///
/// Never surfaced past the resolver; every variant degrades to a
/// straight-line estimate.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("directions request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("directions provider answered with code {0:?}")]
    Status(String),
    #[error("directions provider returned no routes")]
    NoRoute,
    #[error("directions provider unavailable")]
    Unavailable,
}

/// Malformed encoded polyline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("polyline truncated at byte {0}")]
    Truncated(usize),
    #[error("invalid polyline byte {byte:#04x} at {position}")]
    InvalidByte { byte: u8, position: usize },
    #[error("polyline value out of range at byte {position}")]
    Overflow { position: usize },
}

/// Errors raised at the crate's boundaries (loading locations, building
/// clients). The optimization itself does not fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid locations JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("location #{index} rejected: {reason}")]
    InvalidLocation { index: usize, reason: String },
    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_location(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidLocation {
            index,
            reason: reason.into(),
        }
    }
}
