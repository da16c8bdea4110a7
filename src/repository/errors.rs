//! Repository error types
//!
//! System faults only; content problems travel in the returned
//! `Vec<ValidationProblem>` channel, never here. Every fault carries a
//! stable string code so the transport boundary can map it to a status
//! without string matching.

use thiserror::Error;

use crate::schema::SchemaError;
use crate::storage::StorageError;

/// Result type for repository operations.
pub type DataResult<T> = Result<T, DataError>;

/// Repository faults.
#[derive(Debug, Error)]
pub enum DataError {
    /// No entity type with the given name exists
    #[error("entity type '{0}' not found")]
    EntityTypeNotFound(String),

    /// Underlying store fault
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Schema construction fault (defective metadata)
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Invariant breakage inside the pipeline
    #[error("internal error: {0}")]
    Internal(String),
}

impl DataError {
    /// Returns the stable string code.
    pub fn code(&self) -> &'static str {
        match self {
            DataError::EntityTypeNotFound(_) => "PROTEAN_ENTITY_TYPE_NOT_FOUND",
            DataError::Storage(err) => err.code(),
            DataError::Schema(err) => err.code().code(),
            DataError::Internal(_) => "PROTEAN_INTERNAL",
        }
    }
}
