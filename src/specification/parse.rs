//! JSON form of specification trees
//!
//! The REST `q` parameter carries a specification as JSON:
//!
//! ```json
//! { "and": [
//!     { "member": "status", "operator": "==", "value": "sent" },
//!     { "or": [
//!         { "member": "total", "operator": ">", "value": 100 },
//!         { "member": "priority", "operator": "exists" }
//!     ] }
//! ] }
//! ```

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::{
    AndSpecification, ComparisonOperator, MemberComparisonSpecification, OrSpecification,
    Specification,
};

/// Errors from parsing the JSON form of a specification.
#[derive(Debug, Clone, Error)]
pub enum SpecificationParseError {
    #[error("specification must be an object")]
    NotAnObject,

    #[error("'{0}' must hold an array of specifications")]
    CompositeNotArray(String),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("member comparison requires string 'member' and 'operator' fields")]
    MalformedComparison,
}

/// Parses the JSON form of a specification tree.
pub fn parse(value: &Value) -> Result<Arc<dyn Specification>, SpecificationParseError> {
    let obj = value
        .as_object()
        .ok_or(SpecificationParseError::NotAnObject)?;

    if let Some(children) = obj.get("and") {
        return Ok(Arc::new(AndSpecification::new(parse_children(
            "and", children,
        )?)));
    }

    if let Some(children) = obj.get("or") {
        return Ok(Arc::new(OrSpecification::new(parse_children(
            "or", children,
        )?)));
    }

    let member = obj
        .get("member")
        .and_then(Value::as_str)
        .ok_or(SpecificationParseError::MalformedComparison)?;
    let operator_token = obj
        .get("operator")
        .and_then(Value::as_str)
        .ok_or(SpecificationParseError::MalformedComparison)?;
    let operator = ComparisonOperator::parse(operator_token)
        .ok_or_else(|| SpecificationParseError::UnknownOperator(operator_token.to_string()))?;
    let value = obj.get("value").cloned().unwrap_or(Value::Null);

    Ok(Arc::new(MemberComparisonSpecification::new(
        member, operator, value,
    )))
}

fn parse_children(
    tag: &str,
    children: &Value,
) -> Result<Vec<Arc<dyn Specification>>, SpecificationParseError> {
    children
        .as_array()
        .ok_or_else(|| SpecificationParseError::CompositeNotArray(tag.to_string()))?
        .iter()
        .map(parse)
        .collect()
}
