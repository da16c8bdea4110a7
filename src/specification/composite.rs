//! Composite specifications

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::Specification;

/// True when any child is true. Children are evaluated left to right and
/// evaluation stops at the first true result.
pub struct OrSpecification {
    conditions: Vec<Arc<dyn Specification>>,
}

impl OrSpecification {
    pub fn new(conditions: Vec<Arc<dyn Specification>>) -> Self {
        Self { conditions }
    }
}

#[async_trait]
impl Specification for OrSpecification {
    fn discriminator(&self) -> &'static str {
        "or"
    }

    fn description(&self) -> String {
        format!("any of {} conditions", self.conditions.len())
    }

    async fn eval(&self, fact: &Value) -> bool {
        for condition in &self.conditions {
            if condition.eval(fact).await {
                return true;
            }
        }
        false
    }
}

/// True when every child is true. Children are evaluated left to right and
/// evaluation stops at the first false result.
pub struct AndSpecification {
    conditions: Vec<Arc<dyn Specification>>,
}

impl AndSpecification {
    pub fn new(conditions: Vec<Arc<dyn Specification>>) -> Self {
        Self { conditions }
    }
}

#[async_trait]
impl Specification for AndSpecification {
    fn discriminator(&self) -> &'static str {
        "and"
    }

    fn description(&self) -> String {
        format!("all of {} conditions", self.conditions.len())
    }

    async fn eval(&self, fact: &Value) -> bool {
        for condition in &self.conditions {
            if !condition.eval(fact).await {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double that counts how often it is evaluated.
    struct CountingSpecification {
        result: bool,
        evaluations: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Specification for CountingSpecification {
        fn discriminator(&self) -> &'static str {
            "counting"
        }

        fn description(&self) -> String {
            format!("always {}", self.result)
        }

        async fn eval(&self, _fact: &Value) -> bool {
            self.evaluations.fetch_add(1, Ordering::SeqCst);
            self.result
        }
    }

    fn counting(result: bool) -> (Arc<dyn Specification>, Arc<AtomicUsize>) {
        let evaluations = Arc::new(AtomicUsize::new(0));
        let spec = Arc::new(CountingSpecification {
            result,
            evaluations: evaluations.clone(),
        });
        (spec, evaluations)
    }

    #[tokio::test]
    async fn test_or_short_circuits_after_first_true() {
        let (first, first_count) = counting(false);
        let (second, second_count) = counting(true);
        let (third, third_count) = counting(true);

        let or = OrSpecification::new(vec![first, second, third]);
        assert!(or.eval(&json!({})).await);

        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
        assert_eq!(third_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_or_is_false_when_all_children_are_false() {
        let (first, _) = counting(false);
        let (second, _) = counting(false);
        let or = OrSpecification::new(vec![first, second]);
        assert!(!or.eval(&json!({})).await);
    }

    #[tokio::test]
    async fn test_and_short_circuits_after_first_false() {
        let (first, _) = counting(true);
        let (second, _) = counting(false);
        let (third, third_count) = counting(true);

        let and = AndSpecification::new(vec![first, second, third]);
        assert!(!and.eval(&json!({})).await);
        assert_eq!(third_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_composites() {
        assert!(!OrSpecification::new(vec![]).eval(&json!({})).await);
        assert!(AndSpecification::new(vec![]).eval(&json!({})).await);
    }
}
