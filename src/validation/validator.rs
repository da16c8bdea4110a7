//! Two-phase entity validation
//!
//! Phase 1 checks the entity against its type's schema (preferring the
//! persisted schema, else building one). Phase 2 checks every present
//! linked-entity value: the reference must exist and the denormalized
//! values must equal the referenced entity's current values. Both phases
//! always run; their problems concatenate in property-declaration order.

use std::sync::Arc;

use serde_json::Value;

use crate::metadata::builtin::{ENTITY_SCHEMA, ID_FIELD};
use crate::metadata::{Entity, EntityType, ValidationKind};
use crate::repository::{DataResult, RepositoryFactory};
use crate::schema::{evaluate, EntitySchemaBuilder, Schema};
use crate::storage::{Collection as _, DataStore as _};

use super::problem::ValidationProblem;

/// Validates entities against their runtime-defined types.
pub struct EntityValidator;

impl EntityValidator {
    /// Returns every problem with the entity; empty means valid.
    pub async fn validate(
        entity_type: &EntityType,
        entity: &Entity,
        factory: &Arc<RepositoryFactory>,
    ) -> DataResult<Vec<ValidationProblem>> {
        let schema = Self::schema_for(entity_type, factory).await?;

        let document = Value::Object(entity.clone());
        let mut problems: Vec<ValidationProblem> = evaluate(&schema, &document)
            .into_iter()
            .map(ValidationProblem::from_violation)
            .collect();

        problems.extend(Self::linked_entity_problems(entity_type, entity, factory).await?);

        Ok(problems)
    }

    /// Fetches the persisted schema for the type, falling back to building
    /// one from metadata. A persisted schema is trusted over rebuilding.
    async fn schema_for(
        entity_type: &EntityType,
        factory: &Arc<RepositoryFactory>,
    ) -> DataResult<Schema> {
        let schemas = factory.store().collection(ENTITY_SCHEMA);

        if let Some(doc) = schemas.find_by_id(&entity_type.id).await? {
            if let Some(text) = doc.get("schema").and_then(Value::as_str) {
                if let Ok(schema) = serde_json::from_str(text) {
                    return Ok(schema);
                }
            }
        }

        let builder = EntitySchemaBuilder::new(factory.as_ref());
        Ok(builder.build_schema(entity_type).await?)
    }

    /// Integrity of present linked references. Required-ness of the link
    /// itself is the schema's job; absent values are skipped here.
    async fn linked_entity_problems(
        entity_type: &EntityType,
        entity: &Entity,
        factory: &Arc<RepositoryFactory>,
    ) -> DataResult<Vec<ValidationProblem>> {
        let mut problems = Vec::new();

        for prop in &entity_type.properties {
            let ValidationKind::LinkedEntity {
                reference,
                linked_properties,
            } = &prop.validation.kind
            else {
                continue;
            };

            let Some(value) = entity.get(&prop.name) else {
                continue;
            };
            let Some(linked_id) = value.get(ID_FIELD).and_then(Value::as_str) else {
                continue;
            };

            let repository = factory.by_name(&reference.name).await?;
            match repository.find_by_id(linked_id).await? {
                None => problems.push(ValidationProblem::linked_entity_missing(
                    &prop.name,
                    &reference.name,
                    linked_id,
                )),
                Some(live) => {
                    for linked_name in linked_properties {
                        let denormalized = value.get(linked_name);
                        let current = live.get(linked_name);
                        if denormalized != current {
                            let path = format!("{}.{}", prop.name, linked_name);
                            problems.push(ValidationProblem::divergent_linked_value(
                                &path,
                                current.cloned().unwrap_or(Value::Null),
                            ));
                        }
                    }
                }
            }
        }

        Ok(problems)
    }
}
