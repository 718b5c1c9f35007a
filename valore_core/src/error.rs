//! Engine error types.

use thiserror::Error;

/// Errors returned by state-mutating engine operations.
///
/// Read accessors report absence with `Option` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown organization id: {0}")]
    UnknownOrganization(String),

    #[error("Unknown individual id: {0}")]
    UnknownIndividual(String),
}
