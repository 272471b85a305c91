//! Build-time errors.

use thiserror::Error;

/// Result alias for fallible model construction.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// A problem instance that cannot be turned into a model.
///
/// Raised while building a [`Network`](crate::network::Network) or
/// validating a configuration. Solvers never produce this error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("network has no segments")]
    EmptyNetwork,
    #[error("segment {segment} has an empty speed domain")]
    EmptyDomain { segment: String },
    #[error("speed domain values must be positive, got {value}")]
    InvalidDomainValue { value: u32 },
    #[error("segment id {id} appears more than once")]
    DuplicateSegment { id: String },
    #[error("adjacency references unknown segment {id}")]
    UnknownSegment { id: String },
    #[error("segment {id} is listed as adjacent to itself")]
    SelfAdjacency { id: String },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
