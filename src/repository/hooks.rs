//! Lifecycle hooks
//!
//! Each entity type gets a hook set selected by name from [`hooks_for`].
//! The standard hooks implement the normalization every repository applies;
//! the entity-type hooks additionally maintain the self-describing metadata
//! and the persisted-schema cache. `before_save` and `before_delete` can
//! veto a write by returning false; a veto aborts silently, the caller
//! observes zero rows affected.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::metadata::builtin::{self, ENTITY_SCHEMA, ENTITY_TYPE};
use crate::metadata::{Entity, EntityType};
use crate::observability::{Event, Logger};
use crate::schema::EntitySchemaBuilder;
use crate::storage::{Collection as _, DataStore as _};
use crate::validation::ValidationProblem;

use super::errors::DataResult;
use super::events::ChangeEvent;
use super::factory::RepositoryFactory;
use super::helpers;

/// Everything a hook may need: the owning type, the factory (for lookups
/// and events) and the acting identity.
pub struct HookContext {
    pub entity_type: EntityType,
    pub factory: Arc<RepositoryFactory>,
    pub actor: String,
}

/// Capability interface around every mutation.
#[async_trait]
pub trait EntityHooks: Send + Sync {
    /// Identifies the hook set in logs.
    fn name(&self) -> &'static str {
        "standard"
    }

    /// Normalizes the incoming entity before validation.
    async fn before_validation(
        &self,
        ctx: &HookContext,
        entity: Entity,
        is_new: bool,
        old: Option<&Entity>,
    ) -> DataResult<Entity> {
        Ok(standard_normalize(ctx, entity, is_new, old))
    }

    /// Additional type-specific validation, concatenated after the
    /// standard validator's problems.
    async fn validating(
        &self,
        _ctx: &HookContext,
        _entity: &Entity,
        _is_new: bool,
        _old: Option<&Entity>,
    ) -> DataResult<Vec<ValidationProblem>> {
        Ok(Vec::new())
    }

    /// Last chance to veto or adjust the entity. Returning false aborts
    /// the write with no problems reported.
    async fn before_save(
        &self,
        _ctx: &HookContext,
        _entity: &mut Entity,
        _is_new: bool,
        _old: Option<&Entity>,
    ) -> DataResult<bool> {
        Ok(true)
    }

    /// Side effects after a successful write.
    async fn after_save(&self, ctx: &HookContext, entity: &Entity, _is_new: bool) -> DataResult<()> {
        ctx.factory.events().publish(ChangeEvent::EntityWritten {
            entity_type: ctx.entity_type.name.clone(),
            id: entity_id(entity),
        });
        Ok(())
    }

    /// Veto hook before a delete.
    async fn before_delete(&self, _ctx: &HookContext, _entity: &Entity) -> DataResult<bool> {
        Ok(true)
    }

    /// Side effects after a successful delete.
    async fn after_delete(&self, ctx: &HookContext, entity: &Entity) -> DataResult<()> {
        ctx.factory.events().publish(ChangeEvent::EntityDeleted {
            entity_type: ctx.entity_type.name.clone(),
            id: entity_id(entity),
        });
        Ok(())
    }
}

/// The default hook set: normalization only, no veto.
pub struct StandardHooks;

#[async_trait]
impl EntityHooks for StandardHooks {}

/// Hooks for the built-in `entity_type` type.
pub struct EntityTypeHooks;

#[async_trait]
impl EntityHooks for EntityTypeHooks {
    fn name(&self) -> &'static str {
        "entity_type"
    }

    /// New entity types always get the system property definitions, so
    /// instances of them validate with identity and audit fields present.
    async fn before_validation(
        &self,
        ctx: &HookContext,
        entity: Entity,
        is_new: bool,
        old: Option<&Entity>,
    ) -> DataResult<Entity> {
        let mut entity = standard_normalize(ctx, entity, is_new, old);

        if is_new {
            splice_system_properties(&mut entity);
        }

        Ok(entity)
    }

    /// Refreshes the persisted schema for the written type and notifies
    /// listeners that type metadata changed.
    async fn after_save(&self, ctx: &HookContext, entity: &Entity, _is_new: bool) -> DataResult<()> {
        refresh_persisted_schema(ctx, entity).await;

        let name = entity
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        ctx.factory
            .events()
            .publish(ChangeEvent::EntityTypeChanged { name });

        Ok(())
    }
}

/// Selects the hook set for an entity-type name.
pub fn hooks_for(type_name: &str) -> Arc<dyn EntityHooks> {
    match type_name {
        ENTITY_TYPE => Arc::new(EntityTypeHooks),
        _ => Arc::new(StandardHooks),
    }
}

/// The normalization every repository applies: identity, defaults,
/// conventions, date coercion and audit stamping.
pub(crate) fn standard_normalize(
    ctx: &HookContext,
    mut entity: Entity,
    is_new: bool,
    old: Option<&Entity>,
) -> Entity {
    if is_new {
        helpers::ensure_id(&mut entity);
        helpers::apply_defaults(&mut entity, &ctx.entity_type);
        helpers::apply_conventions(&mut entity, &ctx.entity_type);
        helpers::coerce_date_times(&mut entity, &ctx.entity_type);
        helpers::stamp_insert(&mut entity, &ctx.actor);
    } else {
        helpers::apply_conventions(&mut entity, &ctx.entity_type);
        helpers::coerce_date_times(&mut entity, &ctx.entity_type);
        if let Some(old) = old {
            helpers::stamp_update(&mut entity, old, &ctx.actor);
        }
    }
    entity
}

fn entity_id(entity: &Entity) -> String {
    entity
        .get(builtin::ID_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Adds any missing system property definitions to an entity-type document.
fn splice_system_properties(entity: &mut Entity) {
    let mut properties = match entity.get("properties") {
        Some(Value::Array(existing)) => existing.clone(),
        _ => Vec::new(),
    };

    for system_prop in builtin::system_properties() {
        let already_declared = properties.iter().any(|p| {
            p.get("name").and_then(Value::as_str) == Some(system_prop.name.as_str())
        });
        if !already_declared {
            match serde_json::to_value(&system_prop) {
                Ok(value) => properties.push(value),
                Err(_) => continue,
            }
        }
    }

    entity.insert("properties".to_string(), Value::Array(properties));
}

/// Builds and persists the schema for a just-written entity type. A build
/// failure is logged and skipped; validation will surface the same fault
/// when the type is used.
async fn refresh_persisted_schema(ctx: &HookContext, entity: &Entity) {
    let entity_type: EntityType = match serde_json::from_value(Value::Object(entity.clone())) {
        Ok(entity_type) => entity_type,
        Err(err) => {
            Logger::warn(
                Event::SchemaRefreshFailed,
                &[("reason", &err.to_string())],
            );
            return;
        }
    };

    let builder = EntitySchemaBuilder::new(ctx.factory.as_ref());
    let schema = match builder.build_schema(&entity_type).await {
        Ok(schema) => schema,
        Err(err) => {
            Logger::warn(
                Event::SchemaRefreshFailed,
                &[
                    ("entity_type", entity_type.name.as_str()),
                    ("reason", &err.to_string()),
                ],
            );
            return;
        }
    };

    let text = match serde_json::to_string(&schema) {
        Ok(text) => text,
        Err(err) => {
            Logger::warn(
                Event::SchemaRefreshFailed,
                &[("reason", &err.to_string())],
            );
            return;
        }
    };

    let mut doc = Entity::new();
    doc.insert(
        builtin::ID_FIELD.to_string(),
        Value::String(entity_type.id.clone()),
    );
    doc.insert("schema".to_string(), Value::String(text));
    helpers::stamp_insert(&mut doc, &ctx.actor);

    let schemas = ctx.factory.store().collection(ENTITY_SCHEMA);
    if let Err(err) = schemas.upsert_one(&entity_type.id, &doc).await {
        Logger::warn(
            Event::SchemaRefreshFailed,
            &[
                ("entity_type", entity_type.name.as_str()),
                ("reason", &err.to_string()),
            ],
        );
    }
}
