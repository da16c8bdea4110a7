//! Entity validation
//!
//! Shape conformance against the built schema plus linked-entity integrity
//! against the live referenced documents. Content problems are returned as
//! a list, never raised; an empty list means the entity is valid.

mod problem;
mod validator;

pub use problem::{ProblemKind, ValidationProblem};
pub use validator::EntityValidator;
