//! In-memory document store
//!
//! Collections are vectors of documents behind an async RwLock; scans
//! return documents in insertion order, which keeps test assertions and
//! repository bootstrap deterministic. Unique indexes are enforced at
//! insert time.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::metadata::builtin::ID_FIELD;
use crate::metadata::Entity;

use super::collection::{Collection, DataStore, FindOptions, SortOrder};
use super::errors::{StorageError, StorageResult};

/// In-memory implementation of [`DataStore`].
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            collections: Mutex::new(HashMap::new()),
        })
    }
}

impl DataStore for MemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::new(name)))
            .clone()
    }
}

struct IndexSpec {
    field: String,
    unique: bool,
}

struct CollectionInner {
    docs: Vec<Entity>,
    indexes: Vec<IndexSpec>,
}

/// One in-memory collection.
pub struct MemoryCollection {
    name: String,
    inner: RwLock<CollectionInner>,
}

impl MemoryCollection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inner: RwLock::new(CollectionInner {
                docs: Vec::new(),
                indexes: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Entity>> {
        let inner = self.inner.read().await;
        Ok(inner
            .docs
            .iter()
            .find(|doc| doc_id(doc) == Some(id))
            .cloned())
    }

    async fn find(&self, options: FindOptions) -> StorageResult<Vec<Entity>> {
        let inner = self.inner.read().await;

        let mut results: Vec<Entity> = inner
            .docs
            .iter()
            .filter(|doc| matches_filter(doc, options.filter.as_ref()))
            .cloned()
            .collect();

        if let Some((field, order)) = &options.sort {
            results.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        let skip = options.skip.unwrap_or(0);
        let results: Vec<Entity> = results.into_iter().skip(skip).collect();
        let results = match options.limit {
            Some(limit) => results.into_iter().take(limit).collect(),
            None => results,
        };

        Ok(results)
    }

    async fn insert_one(&self, doc: &Entity) -> StorageResult<()> {
        let mut inner = self.inner.write().await;

        if let Some(id) = doc_id(doc) {
            if inner.docs.iter().any(|d| doc_id(d) == Some(id)) {
                return Err(StorageError::duplicate_key(&self.name, ID_FIELD));
            }
        }

        for index in inner.indexes.iter().filter(|i| i.unique) {
            if let Some(value) = doc.get(&index.field) {
                if inner.docs.iter().any(|d| d.get(&index.field) == Some(value)) {
                    return Err(StorageError::duplicate_key(&self.name, &index.field));
                }
            }
        }

        inner.docs.push(doc.clone());
        Ok(())
    }

    async fn upsert_one(&self, id: &str, doc: &Entity) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        match inner.docs.iter().position(|d| doc_id(d) == Some(id)) {
            Some(idx) => inner.docs[idx] = doc.clone(),
            None => inner.docs.push(doc.clone()),
        }
        Ok(())
    }

    async fn update_one(&self, id: &str, doc: &Entity) -> StorageResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.docs.iter().position(|d| doc_id(d) == Some(id)) {
            Some(idx) => {
                inner.docs[idx] = doc.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, id: &str) -> StorageResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.docs.len();
        inner.docs.retain(|d| doc_id(d) != Some(id));
        Ok(inner.docs.len() < before)
    }

    async fn ensure_index(&self, field: &str, unique: bool) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.indexes.iter().any(|i| i.field == field) {
            inner.indexes.push(IndexSpec {
                field: field.to_string(),
                unique,
            });
        }
        Ok(())
    }
}

fn doc_id(doc: &Entity) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

fn matches_filter(doc: &Entity, filter: Option<&serde_json::Map<String, Value>>) -> bool {
    match filter {
        None => true,
        Some(filter) => filter
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected)),
    }
}

/// Total order over JSON values for sorting: absent < null < booleans <
/// numbers < strings; other kinds compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => rank(a).cmp(&rank(b)),
        },
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
