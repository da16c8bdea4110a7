//! Built-in data seeding
//!
//! Seeds the well-known entity types into the store so the repository
//! factory can bootstrap itself from the `entity_type` collection.
//! Idempotent: already-seeded documents are left untouched.

use std::sync::Arc;

use serde_json::Value;

use crate::metadata::builtin::{self, ENTITY_TYPE};
use crate::observability::{Event, Logger};
use crate::repository::helpers;
use crate::storage::{Collection as _, DataStore, StorageError, StorageResult};

/// Seeds built-in entity types and the unique name index.
pub async fn populate(store: &Arc<dyn DataStore>) -> StorageResult<()> {
    let types = store.collection(ENTITY_TYPE);
    types.ensure_index("name", true).await?;

    let mut seeded = 0usize;
    for entity_type in [builtin::entity_type_type(), builtin::entity_schema_type()] {
        if types.find_by_id(&entity_type.id).await?.is_some() {
            continue;
        }

        let value = serde_json::to_value(&entity_type)
            .map_err(|err| StorageError::malformed_document(ENTITY_TYPE, err.to_string()))?;
        let Value::Object(mut doc) = value else {
            return Err(StorageError::malformed_document(
                ENTITY_TYPE,
                "entity type did not serialize to an object",
            ));
        };
        helpers::stamp_insert(&mut doc, "system");

        types.insert_one(&doc).await?;
        seeded += 1;
    }

    Logger::info(Event::StoreSeeded, &[("seeded", &seeded.to_string())]);
    Ok(())
}
