//! Composable boolean predicates over entities
//!
//! A specification is a named, described predicate evaluated asynchronously
//! against a candidate document. Member comparisons read a dotted path off
//! the document and apply an operator; `and`/`or` compose children with
//! short-circuit evaluation. Evaluation never fails: a missing path or an
//! operator applied to an incompatible value degrades to `false` (or to a
//! null comparison for equality), because this is a filtering predicate,
//! not a validator.

mod comparison;
mod composite;
mod parse;

pub use comparison::{ComparisonOperator, MemberComparisonSpecification};
pub use composite::{AndSpecification, OrSpecification};
pub use parse::{parse, SpecificationParseError};

use async_trait::async_trait;
use serde_json::Value;

/// A named, composable boolean predicate over an entity document.
#[async_trait]
pub trait Specification: Send + Sync {
    /// Stable tag identifying the specification variant.
    fn discriminator(&self) -> &'static str;

    /// Human-readable description of what the predicate checks.
    fn description(&self) -> String;

    /// Evaluates the predicate against a candidate document.
    async fn eval(&self, fact: &Value) -> bool;
}

/// Reads a dotted member path off a document. Missing segments yield `None`.
pub(crate) fn member_value<'v>(fact: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = fact;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_member_value_walks_dotted_paths() {
        let fact = json!({ "customer": { "address": { "city": "Lisbon" } } });
        assert_eq!(
            member_value(&fact, "customer.address.city"),
            Some(&json!("Lisbon"))
        );
        assert_eq!(member_value(&fact, "customer.phone"), None);
        assert_eq!(member_value(&fact, "customer.address.city.zip"), None);
    }
}
