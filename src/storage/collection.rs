//! Storage trait seams
//!
//! The repository layer depends only on these traits, so the document store
//! can be swapped without touching the validation or lifecycle machinery.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::metadata::Entity;

use super::errors::StorageResult;

/// Sort direction for scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Options for a filtered scan.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Field-equality filter; all entries must match
    pub filter: Option<serde_json::Map<String, Value>>,
    /// Documents to skip from the start of the result
    pub skip: Option<usize>,
    /// Maximum documents to return
    pub limit: Option<usize>,
    /// Optional sort field and direction; unsorted scans return documents
    /// in insertion order
    pub sort: Option<(String, SortOrder)>,
}

impl FindOptions {
    /// A scan filtered on a single field equality.
    pub fn filter_eq(field: impl Into<String>, value: Value) -> Self {
        let mut filter = serde_json::Map::new();
        filter.insert(field.into(), value);
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }
}

/// One named collection of documents.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Point lookup by document id.
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Entity>>;

    /// Filtered scan.
    async fn find(&self, options: FindOptions) -> StorageResult<Vec<Entity>>;

    /// Inserts a document; unique indexes are enforced.
    async fn insert_one(&self, doc: &Entity) -> StorageResult<()>;

    /// Inserts or fully replaces the document with the given id.
    async fn upsert_one(&self, id: &str, doc: &Entity) -> StorageResult<()>;

    /// Replaces the document with the given id. Returns false if absent.
    async fn update_one(&self, id: &str, doc: &Entity) -> StorageResult<bool>;

    /// Removes the document with the given id. Returns false if absent.
    async fn delete_one(&self, id: &str) -> StorageResult<bool>;

    /// Declares an index over a field. Unique indexes are enforced on
    /// subsequent inserts.
    async fn ensure_index(&self, field: &str, unique: bool) -> StorageResult<()>;
}

/// A document store holding named collections.
pub trait DataStore: Send + Sync {
    /// Returns the collection with the given name, creating it on first use.
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}
