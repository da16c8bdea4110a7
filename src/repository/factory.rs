//! Repository factory and instance cache
//!
//! At most one repository exists per resolved entity-type name. The cache
//! lock is held across the first-resolution fetch, which collapses
//! concurrent resolutions of the same name into a single instance instead
//! of racing duplicate pipelines onto one collection. Resolution is rare
//! and cheap, so serializing it is fine.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::metadata::builtin::ENTITY_TYPE;
use crate::metadata::EntityType;
use crate::schema::{SchemaError, SchemaResult, TypeResolver};
use crate::storage::{Collection as _, DataStore, FindOptions, StorageError};

use super::errors::{DataError, DataResult};
use super::events::EventBus;
use super::hooks::hooks_for;
use super::repository::EntityRepository;

/// Creates and caches repositories, one per entity-type name.
pub struct RepositoryFactory {
    store: Arc<dyn DataStore>,
    events: EventBus,
    cache: Mutex<HashMap<String, Arc<EntityRepository>>>,
    /// Handed to repositories so their hooks can reach back without an
    /// Arc cycle
    self_ref: Weak<RepositoryFactory>,
}

impl RepositoryFactory {
    pub fn new(store: Arc<dyn DataStore>) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            store,
            events: EventBus::new(),
            cache: Mutex::new(HashMap::new()),
            self_ref: self_ref.clone(),
        })
    }

    /// The underlying document store.
    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// The change-event bus shared by all repositories.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the repository for an entity-type name, creating it on
    /// first resolution. The entity-type repository itself is the
    /// bootstrap case: its metadata is fetched from the store like any
    /// other, seeded there at startup.
    pub async fn by_name(&self, name: &str) -> DataResult<Arc<EntityRepository>> {
        let mut cache = self.cache.lock().await;

        if let Some(repository) = cache.get(name) {
            return Ok(repository.clone());
        }

        let entity_type = self
            .fetch_type_by_name(name)
            .await?
            .ok_or_else(|| DataError::EntityTypeNotFound(name.to_string()))?;

        let repository = Arc::new(EntityRepository::new(
            entity_type,
            self.store.collection(name),
            hooks_for(name),
            self.self_ref.clone(),
        ));

        cache.insert(name.to_string(), repository.clone());
        Ok(repository)
    }

    async fn fetch_type_by_name(&self, name: &str) -> DataResult<Option<EntityType>> {
        let types = self.store.collection(ENTITY_TYPE);

        let mut options = FindOptions::filter_eq("name", Value::String(name.to_string()));
        options.limit = Some(1);

        let mut found = types.find(options).await?;
        let Some(doc) = found.pop() else {
            return Ok(None);
        };

        let entity_type = serde_json::from_value(Value::Object(doc)).map_err(|err| {
            DataError::from(StorageError::malformed_document(
                ENTITY_TYPE,
                err.to_string(),
            ))
        })?;

        Ok(Some(entity_type))
    }
}

/// The schema builder resolves linked entity types by id through the
/// factory's store.
#[async_trait]
impl TypeResolver for RepositoryFactory {
    async fn resolve_type(&self, id: &str) -> SchemaResult<Option<EntityType>> {
        let types = self.store.collection(ENTITY_TYPE);

        let doc = types
            .find_by_id(id)
            .await
            .map_err(|err| SchemaError::type_resolution_failed(id, err.to_string()))?;

        match doc {
            None => Ok(None),
            Some(doc) => serde_json::from_value(Value::Object(doc))
                .map(Some)
                .map_err(|err| SchemaError::type_resolution_failed(id, err.to_string())),
        }
    }
}
