//! Shape-validation engine
//!
//! Evaluates a document against a built [`Schema`] and reports every
//! structural violation, not just the first. Output order is deterministic:
//! unknown keys first (document key order), then declared properties in
//! declaration order, recursing depth-first. The engine never mutates the
//! document and never coerces types.

use base64::Engine as _;
use regex::Regex;
use serde_json::Value;

use super::types::{Schema, SchemaProperty};

/// Kinds of structural violations, with stable string codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Type,
    Required,
    AdditionalProperty,
    Pattern,
    Base64,
    Format,
    Minimum,
    Maximum,
    MultipleOf,
    Enum,
    UniqueItems,
}

impl ViolationKind {
    /// Returns the stable string code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Type => "type",
            ViolationKind::Required => "required",
            ViolationKind::AdditionalProperty => "additionalProperty",
            ViolationKind::Pattern => "pattern",
            ViolationKind::Base64 => "base64",
            ViolationKind::Format => "format",
            ViolationKind::Minimum => "minimum",
            ViolationKind::Maximum => "maximum",
            ViolationKind::MultipleOf => "multipleOf",
            ViolationKind::Enum => "enum",
            ViolationKind::UniqueItems => "uniqueItems",
        }
    }
}

/// One structural violation found during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// Dotted path to the offending value ("" for the root)
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl SchemaViolation {
    fn new(path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    fn type_mismatch(path: &str, expected: &str, actual: &Value) -> Self {
        Self::new(
            path,
            ViolationKind::Type,
            format!("expected {}, got {}", expected, json_type_name(actual)),
        )
    }
}

/// Evaluates a value against a schema, returning all violations in
/// deterministic order. An empty result means the value conforms.
pub fn evaluate(schema: &Schema, value: &Value) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    evaluate_value(schema, value, "", &mut violations);
    violations
}

fn evaluate_value(schema: &Schema, value: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    match schema {
        Schema::Object {
            properties,
            additional_properties,
        } => evaluate_object(properties, *additional_properties, value, path, out),

        Schema::String {
            pattern,
            base64_encoded,
        } => {
            let Some(s) = value.as_str() else {
                out.push(SchemaViolation::type_mismatch(path, "string", value));
                return;
            };
            if let Some(pattern) = pattern {
                // Patterns are compile-checked at build time; a persisted
                // schema with a bad pattern skips the constraint.
                if let Ok(re) = Regex::new(pattern) {
                    if !re.is_match(s) {
                        out.push(SchemaViolation::new(
                            path,
                            ViolationKind::Pattern,
                            format!("value does not match pattern '{}'", pattern),
                        ));
                    }
                }
            }
            if *base64_encoded
                && base64::engine::general_purpose::STANDARD
                    .decode(s.as_bytes())
                    .is_err()
            {
                out.push(SchemaViolation::new(
                    path,
                    ViolationKind::Base64,
                    "value is not valid base64",
                ));
            }
        }

        Schema::DateTime => {
            let Some(s) = value.as_str() else {
                out.push(SchemaViolation::type_mismatch(path, "string", value));
                return;
            };
            if chrono::DateTime::parse_from_rfc3339(s).is_err() {
                out.push(SchemaViolation::new(
                    path,
                    ViolationKind::Format,
                    "value is not a valid RFC 3339 date-time",
                ));
            }
        }

        Schema::Enum { values } => {
            let Some(s) = value.as_str() else {
                out.push(SchemaViolation::type_mismatch(path, "string", value));
                return;
            };
            if !values.iter().any(|v| v == s) {
                out.push(SchemaViolation::new(
                    path,
                    ViolationKind::Enum,
                    format!("value '{}' is not one of the allowed literals", s),
                ));
            }
        }

        Schema::Number {
            min,
            max,
            multiple_of,
        } => {
            let Some(n) = value.as_f64() else {
                out.push(SchemaViolation::type_mismatch(path, "number", value));
                return;
            };
            if let Some(min) = min {
                if n < *min {
                    out.push(SchemaViolation::new(
                        path,
                        ViolationKind::Minimum,
                        format!("value {} is below minimum {}", n, min),
                    ));
                }
            }
            if let Some(max) = max {
                if n > *max {
                    out.push(SchemaViolation::new(
                        path,
                        ViolationKind::Maximum,
                        format!("value {} is above maximum {}", n, max),
                    ));
                }
            }
            if let Some(m) = multiple_of {
                let is_multiple = if *m == 0.0 {
                    n == 0.0
                } else {
                    let ratio = n / m;
                    (ratio - ratio.round()).abs() < 1e-9
                };
                if !is_multiple {
                    out.push(SchemaViolation::new(
                        path,
                        ViolationKind::MultipleOf,
                        format!("value {} is not a multiple of {}", n, m),
                    ));
                }
            }
        }

        Schema::Integer {
            min,
            max,
            multiple_of,
        } => {
            // Floats are not integers, no coercion.
            let Some(n) = value.as_i64() else {
                out.push(SchemaViolation::type_mismatch(path, "integer", value));
                return;
            };
            if let Some(min) = min {
                if n < *min {
                    out.push(SchemaViolation::new(
                        path,
                        ViolationKind::Minimum,
                        format!("value {} is below minimum {}", n, min),
                    ));
                }
            }
            if let Some(max) = max {
                if n > *max {
                    out.push(SchemaViolation::new(
                        path,
                        ViolationKind::Maximum,
                        format!("value {} is above maximum {}", n, max),
                    ));
                }
            }
            if let Some(m) = multiple_of {
                let is_multiple = if *m == 0 { n == 0 } else { n % m == 0 };
                if !is_multiple {
                    out.push(SchemaViolation::new(
                        path,
                        ViolationKind::MultipleOf,
                        format!("value {} is not a multiple of {}", n, m),
                    ));
                }
            }
        }

        Schema::Boolean => {
            if !value.is_boolean() {
                out.push(SchemaViolation::type_mismatch(path, "boolean", value));
            }
        }

        Schema::Array {
            items,
            unique_items,
        } => {
            let Some(elements) = value.as_array() else {
                out.push(SchemaViolation::type_mismatch(path, "array", value));
                return;
            };
            for (i, element) in elements.iter().enumerate() {
                let element_path = format!("{}[{}]", path, i);
                evaluate_value(items, element, &element_path, out);
            }
            if *unique_items {
                for i in 1..elements.len() {
                    if elements[..i].contains(&elements[i]) {
                        out.push(SchemaViolation::new(
                            format!("{}[{}]", path, i),
                            ViolationKind::UniqueItems,
                            "duplicate array element",
                        ));
                    }
                }
            }
        }

        Schema::Any => {}
    }
}

fn evaluate_object(
    properties: &[SchemaProperty],
    additional_properties: bool,
    value: &Value,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    let Some(obj) = value.as_object() else {
        out.push(SchemaViolation::type_mismatch(path, "object", value));
        return;
    };

    if !additional_properties {
        for key in obj.keys() {
            if !properties.iter().any(|p| p.name == *key) {
                out.push(SchemaViolation::new(
                    make_path(path, key),
                    ViolationKind::AdditionalProperty,
                    "undeclared property",
                ));
            }
        }
    }

    for prop in properties {
        let prop_path = make_path(path, &prop.name);
        match obj.get(&prop.name) {
            Some(v) => evaluate_value(&prop.schema, v, &prop_path, out),
            None => {
                if prop.required {
                    out.push(SchemaViolation::new(
                        prop_path,
                        ViolationKind::Required,
                        "required property is missing",
                    ));
                }
            }
        }
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a dotted path from prefix and property name.
fn make_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
