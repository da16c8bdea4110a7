//! Built-schema tree
//!
//! A [`Schema`] is the executable form of an entity type's validation
//! metadata. Construction is deterministic: properties appear in declaration
//! order, so identical metadata always yields an identical (and identically
//! serialized) schema. The serialized form is what the `entity_schema`
//! collection persists.

use serde::{Deserialize, Serialize};

/// Executable validation schema for a document or a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Schema {
    /// Object with declared properties; unknown keys rejected unless
    /// `additional_properties` is set
    Object {
        properties: Vec<SchemaProperty>,
        additional_properties: bool,
    },
    /// UTF-8 string with optional content constraints
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        #[serde(default)]
        base64_encoded: bool,
    },
    /// RFC 3339 date-time string
    DateTime,
    /// String restricted to a literal set
    Enum { values: Vec<String> },
    /// 64-bit float; a bound of exactly zero is a real bound
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multiple_of: Option<f64>,
    },
    /// 64-bit signed integer
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multiple_of: Option<i64>,
    },
    /// Boolean
    Boolean,
    /// Homogeneous array (boxed to allow recursive schemas)
    Array {
        items: Box<Schema>,
        #[serde(default)]
        unique_items: bool,
    },
    /// Accepts any value
    Any,
}

impl Schema {
    /// An object schema that rejects unknown keys.
    pub fn strict_object(properties: Vec<SchemaProperty>) -> Self {
        Schema::Object {
            properties,
            additional_properties: false,
        }
    }

    /// An unconstrained string schema.
    pub fn plain_string() -> Self {
        Schema::String {
            pattern: None,
            base64_encoded: false,
        }
    }

    /// Returns the schema kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Schema::Object { .. } => "object",
            Schema::String { .. } => "string",
            Schema::DateTime => "dateTime",
            Schema::Enum { .. } => "enum",
            Schema::Number { .. } => "number",
            Schema::Integer { .. } => "integer",
            Schema::Boolean => "boolean",
            Schema::Array { .. } => "array",
            Schema::Any => "any",
        }
    }
}

/// One declared property of an object schema, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    pub name: String,
    pub required: bool,
    pub schema: Schema,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::strict_object(vec![
            SchemaProperty {
                name: "name".into(),
                required: true,
                schema: Schema::plain_string(),
            },
            SchemaProperty {
                name: "total".into(),
                required: false,
                schema: Schema::Number {
                    min: Some(0.0),
                    max: None,
                    multiple_of: None,
                },
            },
        ])
    }

    #[test]
    fn test_schema_round_trips_through_text() {
        let schema = sample_schema();
        let text = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&text).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_serialization_is_stable() {
        let first = serde_json::to_string(&sample_schema()).unwrap();
        let second = serde_json::to_string(&sample_schema()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_bound_is_not_dropped() {
        let text = serde_json::to_string(&sample_schema()).unwrap();
        assert!(text.contains("\"min\":0.0") || text.contains("\"min\":0"));
    }
}
