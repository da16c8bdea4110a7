//! Schema construction error types
//!
//! These are system faults — defects in entity-type metadata or failures of
//! the type lookup — never user-content problems. Content problems are
//! reported as validation problems, not errors.
//!
//! Error codes:
//! - PROTEAN_LINKED_TYPE_NOT_FOUND (REJECT)
//! - PROTEAN_LINKED_PROPERTY_UNKNOWN (REJECT)
//! - PROTEAN_INVALID_PATTERN (REJECT)
//! - PROTEAN_TYPE_RESOLUTION_FAILED (FAULT)

use std::fmt;

/// Schema construction error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// A linkedEntity/abstractEntity ref points at an unknown entity type
    LinkedTypeNotFound,
    /// A linked property names a property absent from the referenced type
    LinkedPropertyUnknown,
    /// A string pattern in the metadata is not a valid regular expression
    InvalidPattern,
    /// The entity-type lookup itself failed (store fault)
    TypeResolutionFailed,
}

impl SchemaErrorCode {
    /// Returns the stable string code.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::LinkedTypeNotFound => "PROTEAN_LINKED_TYPE_NOT_FOUND",
            SchemaErrorCode::LinkedPropertyUnknown => "PROTEAN_LINKED_PROPERTY_UNKNOWN",
            SchemaErrorCode::InvalidPattern => "PROTEAN_INVALID_PATTERN",
            SchemaErrorCode::TypeResolutionFailed => "PROTEAN_TYPE_RESOLUTION_FAILED",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema construction error with full context.
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Referenced entity type name or id, when applicable
    type_ref: Option<String>,
    /// Offending property name, when applicable
    property: Option<String>,
}

impl SchemaError {
    /// A link references an entity type that does not exist.
    pub fn linked_type_not_found(type_ref: impl Into<String>) -> Self {
        let type_ref = type_ref.into();
        Self {
            code: SchemaErrorCode::LinkedTypeNotFound,
            message: format!("Referenced entity type '{}' not found", type_ref),
            type_ref: Some(type_ref),
            property: None,
        }
    }

    /// A linked property does not exist on the referenced type.
    pub fn linked_property_unknown(
        type_name: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        let type_name = type_name.into();
        let property = property.into();
        Self {
            code: SchemaErrorCode::LinkedPropertyUnknown,
            message: format!(
                "Linked property '{}' does not exist on entity type '{}'",
                property, type_name
            ),
            type_ref: Some(type_name),
            property: Some(property),
        }
    }

    /// A validation pattern failed to compile.
    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::InvalidPattern,
            message: format!(
                "Pattern '{}' is not a valid regular expression",
                pattern.into()
            ),
            type_ref: None,
            property: None,
        }
    }

    /// The entity-type lookup failed.
    pub fn type_resolution_failed(type_ref: impl Into<String>, reason: impl Into<String>) -> Self {
        let type_ref = type_ref.into();
        Self {
            code: SchemaErrorCode::TypeResolutionFailed,
            message: format!(
                "Failed to resolve entity type '{}': {}",
                type_ref,
                reason.into()
            ),
            type_ref: Some(type_ref),
            property: None,
        }
    }

    /// Returns the error code.
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the referenced type name or id, if any.
    pub fn type_ref(&self) -> Option<&str> {
        self.type_ref.as_deref()
    }

    /// Returns the offending property name, if any.
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema construction.
pub type SchemaResult<T> = Result<T, SchemaError>;
