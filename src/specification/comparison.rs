//! Member comparison specification

use async_trait::async_trait;
use serde_json::Value;

use super::{member_value, Specification};

/// Operators usable in a member comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Exists,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    NotEqual,
    StartsWith,
    EndsWith,
}

impl ComparisonOperator {
    /// Parses an operator token. Both the word form and the legacy sigil
    /// form are accepted.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "exists" | "?" => Some(ComparisonOperator::Exists),
            ">" => Some(ComparisonOperator::GreaterThan),
            "<" => Some(ComparisonOperator::LessThan),
            ">=" => Some(ComparisonOperator::GreaterOrEqual),
            "<=" => Some(ComparisonOperator::LessOrEqual),
            "==" => Some(ComparisonOperator::Equal),
            "!=" => Some(ComparisonOperator::NotEqual),
            "startsWith" | "*%" => Some(ComparisonOperator::StartsWith),
            "endsWith" | "%*" => Some(ComparisonOperator::EndsWith),
            _ => None,
        }
    }

    /// Returns the canonical token.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Exists => "exists",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::StartsWith => "startsWith",
            ComparisonOperator::EndsWith => "endsWith",
        }
    }
}

/// Compares a member of the candidate document against a fixed value.
pub struct MemberComparisonSpecification {
    member: String,
    operator: ComparisonOperator,
    value: Value,
}

impl MemberComparisonSpecification {
    pub fn new(member: impl Into<String>, operator: ComparisonOperator, value: Value) -> Self {
        Self {
            member: member.into(),
            operator,
            value,
        }
    }
}

#[async_trait]
impl Specification for MemberComparisonSpecification {
    fn discriminator(&self) -> &'static str {
        "memberComparison"
    }

    fn description(&self) -> String {
        format!("{} {} {}", self.member, self.operator.as_str(), self.value)
    }

    async fn eval(&self, fact: &Value) -> bool {
        let actual = member_value(fact, &self.member);

        match self.operator {
            ComparisonOperator::Exists => actual.is_some_and(|v| !v.is_null()),

            // Equality treats a missing member as null, no coercion.
            ComparisonOperator::Equal => actual.unwrap_or(&Value::Null) == &self.value,
            ComparisonOperator::NotEqual => actual.unwrap_or(&Value::Null) != &self.value,

            ComparisonOperator::GreaterThan => ordered(actual, &self.value, |o| o.is_gt()),
            ComparisonOperator::LessThan => ordered(actual, &self.value, |o| o.is_lt()),
            ComparisonOperator::GreaterOrEqual => ordered(actual, &self.value, |o| o.is_ge()),
            ComparisonOperator::LessOrEqual => ordered(actual, &self.value, |o| o.is_le()),

            ComparisonOperator::StartsWith => match (actual.and_then(Value::as_str), self.value.as_str()) {
                (Some(actual), Some(prefix)) => actual.starts_with(prefix),
                _ => false,
            },
            ComparisonOperator::EndsWith => match (actual.and_then(Value::as_str), self.value.as_str()) {
                (Some(actual), Some(suffix)) => actual.ends_with(suffix),
                _ => false,
            },
        }
    }
}

/// Ordered comparison over numbers or strings; anything else is `false`.
fn ordered(
    actual: Option<&Value>,
    expected: &Value,
    test: impl Fn(std::cmp::Ordering) -> bool,
) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).map(&test).unwrap_or(false),
            _ => false,
        },
        (Value::String(a), Value::String(b)) => test(a.as_str().cmp(b.as_str())),
        _ => false,
    }
}
