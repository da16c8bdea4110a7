//! # REST API Errors
//!
//! The HTTP status is a pure function of the error kind; nothing here
//! matches on message strings. Server-side faults are logged at response
//! time, client errors are not.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::observability::{Event, Logger};
use crate::repository::DataError;
use crate::storage::StorageError;
use crate::validation::ValidationProblem;

/// REST request errors.
#[derive(Debug, Error)]
pub enum RequestError {
    // ==================
    // Client errors (4xx)
    // ==================
    /// Request reached the resource root without an entity-type name
    #[error("no entity type specified")]
    NoEntityTypeSpecified,

    /// Unparseable query parameters
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// Unparseable or non-object request body
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// Unknown entity-type name
    #[error("entity type '{0}' not found")]
    EntityTypeNotFound(String),

    /// Unknown entity id within a known type
    #[error("{entity_type} '{id}' not found")]
    EntityNotFound { entity_type: String, id: String },

    /// The entity failed validation
    #[error("entity validation failed")]
    Validation(Vec<ValidationProblem>),

    /// A unique constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),

    /// Verb not supported on this resource
    #[error("method not allowed")]
    MethodNotAllowed,

    // ==================
    // Server errors (5xx)
    // ==================
    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl RequestError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::NoEntityTypeSpecified => StatusCode::BAD_REQUEST,
            RequestError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            RequestError::MalformedBody(_) => StatusCode::BAD_REQUEST,

            RequestError::EntityTypeNotFound(_) => StatusCode::NOT_FOUND,
            RequestError::EntityNotFound { .. } => StatusCode::NOT_FOUND,

            RequestError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RequestError::Conflict(_) => StatusCode::CONFLICT,
            RequestError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            RequestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the stable string code.
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::NoEntityTypeSpecified => "PROTEAN_NO_ENTITY_TYPE",
            RequestError::MalformedQuery(_) => "PROTEAN_MALFORMED_QUERY",
            RequestError::MalformedBody(_) => "PROTEAN_MALFORMED_BODY",
            RequestError::EntityTypeNotFound(_) => "PROTEAN_ENTITY_TYPE_NOT_FOUND",
            RequestError::EntityNotFound { .. } => "PROTEAN_ENTITY_NOT_FOUND",
            RequestError::Validation(_) => "PROTEAN_VALIDATION_FAILED",
            RequestError::Conflict(_) => "PROTEAN_DUPLICATE_KEY",
            RequestError::MethodNotAllowed => "PROTEAN_METHOD_NOT_ALLOWED",
            RequestError::Internal(_) => "PROTEAN_INTERNAL",
        }
    }
}

impl From<DataError> for RequestError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::EntityTypeNotFound(name) => RequestError::EntityTypeNotFound(name),
            DataError::Storage(StorageError::DuplicateKey { collection, field }) => {
                RequestError::Conflict(format!(
                    "duplicate value for unique field '{}' in '{}'",
                    field, collection
                ))
            }
            DataError::Storage(err) => RequestError::Internal(err.to_string()),
            DataError::Schema(err) => RequestError::Internal(err.to_string()),
            DataError::Internal(message) => RequestError::Internal(message),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problems: Option<Vec<ValidationProblem>>,
}

impl From<&RequestError> for ErrorResponse {
    fn from(err: &RequestError) -> Self {
        let problems = match err {
            RequestError::Validation(problems) => Some(problems.clone()),
            _ => None,
        };
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            status: err.status_code().as_u16(),
            problems,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            Logger::error(
                Event::RequestFailed,
                &[("code", self.code()), ("reason", &self.to_string())],
            );
        }

        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RequestError::NoEntityTypeSpecified.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::EntityTypeNotFound("order".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::Validation(vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            RequestError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            RequestError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_fault_mapping_is_kind_based() {
        let err = RequestError::from(DataError::EntityTypeNotFound("order".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = RequestError::from(DataError::from(StorageError::duplicate_key(
            "entity_type",
            "name",
        )));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = RequestError::from(DataError::from(SchemaError::linked_type_not_found(
            "ghost",
        )));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_body_carries_problems() {
        let problem = ValidationProblem::linked_entity_missing("customer", "customer", "c-9");
        let response = ErrorResponse::from(&RequestError::Validation(vec![problem]));
        assert_eq!(response.code, "PROTEAN_VALIDATION_FAILED");
        assert_eq!(response.problems.unwrap().len(), 1);
    }
}
