//! Error types for Sightline.
//!
//! All fallible operations in the crate return [`Result`], which wraps
//! [`SightlineError`]. The core fails fast: malformed input is rejected at
//! the boundary rather than producing partial or default geometry.

use thiserror::Error;

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SightlineError>;

/// Errors produced by Sightline operations.
#[derive(Debug, Error)]
pub enum SightlineError {
    /// Latitude or longitude was non-finite or outside the valid range
    /// at `GeoPoint` construction.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// A radius, sphere radius, or unit-conversion input was non-finite
    /// or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed sighting data or user identifier.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The sighting-source collaborator failed. No partial aggregation
    /// results are produced when this is returned.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Any other failure, typically from a counter-store implementation.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SightlineError {
    fn from(err: serde_json::Error) -> Self {
        SightlineError::InvalidInput(err.to_string())
    }
}
