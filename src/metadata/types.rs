//! Entity type, property and validation descriptors
//!
//! Supported property kinds:
//! - string: UTF-8 string, optional pattern / base64 content constraint
//! - number: 64-bit float with optional bounds
//! - int: 64-bit signed integer with optional bounds
//! - boolean: never omittable (false must be distinguishable from absent)
//! - dateTime: RFC 3339 string
//! - enum: string restricted to a literal set
//! - array: homogeneous array with an element validation
//! - linkedEntity: reference to another entity type with denormalized fields
//! - abstractEntity: reference whose target may be any concrete subtype
//! - any: unconstrained (used by the self-describing built-in types)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An entity instance: an open document keyed by property name.
pub type Entity = serde_json::Map<String, Value>;

/// A runtime-defined record kind, stored as a document itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    /// Document identity
    #[serde(rename = "_id")]
    pub id: String,
    /// Unique, stable key used for lookup
    pub name: String,
    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Marks a polymorphic target for abstractEntity links
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    /// Ordered property declarations
    #[serde(default)]
    pub properties: Vec<EntityProperty>,
}

impl EntityType {
    /// Finds a property declaration by name.
    pub fn property(&self, name: &str) -> Option<&EntityProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A single named, validated property of an entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProperty {
    /// Unique within the owning entity type
    pub name: String,
    /// Validation specification for values of this property
    pub validation: Validation,
}

/// Pointer to another entity type, as stored on linkedEntity validations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeRef {
    /// Target entity type id
    #[serde(rename = "_id")]
    pub id: String,
    /// Target entity type name
    pub name: String,
}

/// Declarative validation specification for one property.
///
/// The kind-specific fields live in [`ValidationKind`]; the fields common to
/// every kind are flattened alongside the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    /// Kind tag plus kind-specific constraints
    #[serde(flatten)]
    pub kind: ValidationKind,
    /// Whether a value must be present
    #[serde(default)]
    pub required: bool,
    /// Value applied when the caller omits the property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Formatting rule applied before validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convention: Option<PropertyConvention>,
}

impl Validation {
    /// A bare validation of the given kind with no common constraints.
    pub fn of(kind: ValidationKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            convention: None,
        }
    }

    /// Same as [`Validation::of`] but with `required` set.
    pub fn required(kind: ValidationKind) -> Self {
        Self {
            kind,
            required: true,
            default: None,
            convention: None,
        }
    }
}

/// The closed set of property kinds.
///
/// Bounds are explicit `Option`s: a `min`/`max`/`multiple_of` of exactly
/// zero is a real constraint, distinct from "not set".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidationKind {
    /// UTF-8 string
    String {
        /// Unanchored regular expression the value must match
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        /// Value must be valid standard base64
        #[serde(default)]
        base64_encoded: bool,
    },
    /// 64-bit floating point
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multiple_of: Option<f64>,
    },
    /// 64-bit signed integer
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multiple_of: Option<i64>,
    },
    /// Boolean
    Boolean,
    /// RFC 3339 date-time string
    DateTime,
    /// String restricted to a literal set
    Enum {
        #[serde(rename = "enum")]
        values: Vec<String>,
    },
    /// Homogeneous array (boxed to allow recursive validations)
    Array {
        items: Box<Validation>,
        #[serde(default)]
        unique_items: bool,
    },
    /// Reference to another entity type with a denormalized subset of its
    /// properties kept on the link
    LinkedEntity {
        #[serde(rename = "ref")]
        reference: EntityTypeRef,
        #[serde(default)]
        linked_properties: Vec<String>,
    },
    /// Like linkedEntity, but the target may be any concrete subtype of the
    /// referenced abstract type
    AbstractEntity {
        #[serde(rename = "ref")]
        reference: EntityTypeRef,
        #[serde(default)]
        linked_properties: Vec<String>,
    },
    /// Unconstrained value
    Any,
}

impl ValidationKind {
    /// Returns the kind tag for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ValidationKind::String { .. } => "string",
            ValidationKind::Number { .. } => "number",
            ValidationKind::Int { .. } => "int",
            ValidationKind::Boolean => "boolean",
            ValidationKind::DateTime => "dateTime",
            ValidationKind::Enum { .. } => "enum",
            ValidationKind::Array { .. } => "array",
            ValidationKind::LinkedEntity { .. } => "linkedEntity",
            ValidationKind::AbstractEntity { .. } => "abstractEntity",
            ValidationKind::Any => "any",
        }
    }
}

/// Naming/formatting rule applied to string values before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyConvention {
    LowerCase,
    UpperCase,
    Capitalized,
}

impl PropertyConvention {
    /// Applies the convention to a string value.
    pub fn apply(&self, value: &str) -> String {
        match self {
            PropertyConvention::LowerCase => value.to_lowercase(),
            PropertyConvention::UpperCase => value.to_uppercase(),
            PropertyConvention::Capitalized => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_tags_round_trip() {
        let validation = Validation::required(ValidationKind::String {
            pattern: Some("^[a-z]+$".into()),
            base64_encoded: false,
        });

        let value = serde_json::to_value(&validation).unwrap();
        assert_eq!(value["type"], "string");
        assert_eq!(value["required"], true);
        assert_eq!(value["pattern"], "^[a-z]+$");

        let back: Validation = serde_json::from_value(value).unwrap();
        assert_eq!(back, validation);
    }

    #[test]
    fn test_linked_entity_tag() {
        let validation = Validation::of(ValidationKind::LinkedEntity {
            reference: EntityTypeRef {
                id: "et-1".into(),
                name: "customer".into(),
            },
            linked_properties: vec!["_id".into(), "name".into()],
        });

        let value = serde_json::to_value(&validation).unwrap();
        assert_eq!(value["type"], "linkedEntity");
        assert_eq!(value["ref"]["name"], "customer");
        assert_eq!(value["linked_properties"][1], "name");
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let result: Result<Validation, _> = serde_json::from_value(json!({ "type": "vector" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_bound_survives_round_trip() {
        let validation = Validation::of(ValidationKind::Int {
            min: Some(0),
            max: None,
            multiple_of: None,
        });

        let value = serde_json::to_value(&validation).unwrap();
        let back: Validation = serde_json::from_value(value).unwrap();
        match back.kind {
            ValidationKind::Int { min, .. } => assert_eq!(min, Some(0)),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_entity_type_serde() {
        let doc = json!({
            "_id": "et-42",
            "name": "order",
            "label": "Order",
            "properties": [
                { "name": "total", "validation": { "type": "number", "min": 0.0 } }
            ]
        });

        let entity_type: EntityType = serde_json::from_value(doc).unwrap();
        assert_eq!(entity_type.id, "et-42");
        assert!(!entity_type.is_abstract);
        assert_eq!(entity_type.properties.len(), 1);
        assert!(entity_type.property("total").is_some());
        assert!(entity_type.property("missing").is_none());
    }

    #[test]
    fn test_conventions() {
        assert_eq!(PropertyConvention::LowerCase.apply("MiXeD"), "mixed");
        assert_eq!(PropertyConvention::UpperCase.apply("MiXeD"), "MIXED");
        assert_eq!(PropertyConvention::Capitalized.apply("order"), "Order");
        assert_eq!(PropertyConvention::Capitalized.apply(""), "");
    }
}
