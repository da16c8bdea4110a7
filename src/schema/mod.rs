//! Executable validation schemas built from entity-type metadata
//!
//! The builder turns declarative property validations into a [`Schema`]
//! tree, recursively resolving links to other runtime-defined entity types.
//! The engine evaluates a document against a built schema and reports every
//! structural violation in deterministic order.

mod builder;
mod engine;
mod errors;
mod types;

pub use builder::{EntitySchemaBuilder, TypeResolver};
pub use engine::{evaluate, SchemaViolation, ViolationKind};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use types::{Schema, SchemaProperty};
