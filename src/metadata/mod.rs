//! Metadata model for runtime-defined entity types
//!
//! Entity types are themselves documents: a name plus an ordered list of
//! typed, validated properties. Everything in this module is pure data —
//! behavior lives in the schema builder and the validator.

pub mod builtin;
mod types;

pub use types::{
    Entity, EntityProperty, EntityType, EntityTypeRef, PropertyConvention, Validation,
    ValidationKind,
};
