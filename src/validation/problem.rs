//! Validation problem descriptors

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{SchemaViolation, ViolationKind};

/// Stable problem kinds, serialized with the codes clients match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProblemKind {
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
    LinkedEntityDoesNotExist,
    DivergentLinkedValue,
}

impl From<ViolationKind> for ProblemKind {
    fn from(kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::Type => ProblemKind::Type,
            ViolationKind::Required => ProblemKind::Required,
            ViolationKind::AdditionalProperty => ProblemKind::AdditionalProperty,
            ViolationKind::Pattern => ProblemKind::Pattern,
            ViolationKind::Base64 => ProblemKind::Base64,
            ViolationKind::Format => ProblemKind::Format,
            ViolationKind::Minimum => ProblemKind::Minimum,
            ViolationKind::Maximum => ProblemKind::Maximum,
            ViolationKind::MultipleOf => ProblemKind::MultipleOf,
            ViolationKind::Enum => ProblemKind::Enum,
            ViolationKind::UniqueItems => ProblemKind::UniqueItems,
        }
    }
}

/// One reason an entity failed shape or integrity checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationProblem {
    /// Dotted path to the offending property ("" for the root)
    pub property: String,
    pub kind: ProblemKind,
    pub message: String,
    /// Contextual arguments, e.g. the referenced type and missing id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl ValidationProblem {
    /// Maps one shape-engine violation to a problem.
    pub fn from_violation(violation: SchemaViolation) -> Self {
        Self {
            property: violation.path,
            kind: violation.kind.into(),
            message: violation.message,
            args: Vec::new(),
        }
    }

    /// A linked reference points at an entity that does not exist.
    pub fn linked_entity_missing(property: &str, type_name: &str, id: &str) -> Self {
        Self {
            property: property.to_string(),
            kind: ProblemKind::LinkedEntityDoesNotExist,
            message: format!("linked {} '{}' does not exist", type_name, id),
            args: vec![Value::String(type_name.into()), Value::String(id.into())],
        }
    }

    /// A denormalized linked value no longer matches the referenced entity.
    /// Carries the current value of the source of truth.
    pub fn divergent_linked_value(path: &str, current: Value) -> Self {
        Self {
            property: path.to_string(),
            kind: ProblemKind::DivergentLinkedValue,
            message: format!("value of '{}' diverges from the linked entity", path),
            args: vec![Value::String(path.into()), current],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_codes_are_stable() {
        assert_eq!(
            serde_json::to_value(ProblemKind::LinkedEntityDoesNotExist).unwrap(),
            json!("linkedEntityDoesNotExist")
        );
        assert_eq!(
            serde_json::to_value(ProblemKind::DivergentLinkedValue).unwrap(),
            json!("divergentLinkedValue")
        );
        assert_eq!(
            serde_json::to_value(ProblemKind::AdditionalProperty).unwrap(),
            json!("additionalProperty")
        );
    }

    #[test]
    fn test_divergent_problem_carries_current_value() {
        let problem = ValidationProblem::divergent_linked_value("customer.name", json!("Beatriz"));
        assert_eq!(problem.property, "customer.name");
        assert_eq!(problem.args[1], json!("Beatriz"));
    }
}
