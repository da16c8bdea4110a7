//! proteandb - a self-hostable document store with runtime-defined entity types
//!
//! Entity types are data: a name plus an ordered list of typed, validated
//! properties, stored in the same repositories as the entities they
//! describe. Schemas are built from that metadata on demand (or read from
//! the persisted cache), and every write runs shape and linked-entity
//! integrity validation through a per-type lifecycle-hook pipeline.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod metadata;
pub mod observability;
pub mod repository;
pub mod rest_api;
pub mod schema;
pub mod specification;
pub mod storage;
pub mod validation;
