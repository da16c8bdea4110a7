//! Generic CRUD pipeline for one entity type
//!
//! Every mutation runs the same state machine: normalize via hooks,
//! validate (shape + linked integrity), give the hooks a veto, persist,
//! then run side effects. Validation problems abort the write and travel
//! back to the caller in the result, never as an error.

use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::metadata::builtin::ID_FIELD;
use crate::metadata::{Entity, EntityType};
use crate::specification::Specification;
use crate::storage::{Collection, FindOptions};
use crate::validation::{EntityValidator, ValidationProblem};

use super::errors::{DataError, DataResult};
use super::factory::RepositoryFactory;
use super::hooks::{EntityHooks, HookContext};

/// Outcome of an insert or update.
#[derive(Debug)]
pub enum WriteResult {
    /// The entity as persisted, including system-populated fields
    Written(Entity),
    /// Validation problems; nothing was written
    Invalid(Vec<ValidationProblem>),
    /// A hook vetoed the write; nothing was written and no problem raised
    Vetoed,
    /// No stored entity with the given id (updates only)
    NotFound,
}

/// Outcome of a delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteResult {
    Deleted,
    Vetoed,
    NotFound,
}

/// Repository for one resolved entity type.
pub struct EntityRepository {
    entity_type: EntityType,
    collection: Arc<dyn Collection>,
    hooks: Arc<dyn EntityHooks>,
    factory: Weak<RepositoryFactory>,
}

impl std::fmt::Debug for EntityRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRepository")
            .field("entity_type", &self.entity_type)
            .finish_non_exhaustive()
    }
}

impl EntityRepository {
    pub fn new(
        entity_type: EntityType,
        collection: Arc<dyn Collection>,
        hooks: Arc<dyn EntityHooks>,
        factory: Weak<RepositoryFactory>,
    ) -> Self {
        Self {
            entity_type,
            collection,
            hooks,
            factory,
        }
    }

    /// The entity type this repository serves.
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Point lookup by id.
    pub async fn find_by_id(&self, id: &str) -> DataResult<Option<Entity>> {
        Ok(self.collection.find_by_id(id).await?)
    }

    /// Scan with optional predicate filter and paging. With a predicate the
    /// whole collection is scanned and paging applies to the filtered
    /// sequence.
    pub async fn find_many(
        &self,
        predicate: Option<&Arc<dyn Specification>>,
        skip: Option<usize>,
        limit: Option<usize>,
    ) -> DataResult<Vec<Entity>> {
        match predicate {
            None => {
                let options = FindOptions {
                    skip,
                    limit,
                    ..Default::default()
                };
                Ok(self.collection.find(options).await?)
            }
            Some(predicate) => {
                let all = self.collection.find(FindOptions::default()).await?;
                let mut matched = Vec::new();
                for entity in all {
                    if predicate.eval(&Value::Object(entity.clone())).await {
                        matched.push(entity);
                    }
                }
                let matched: Vec<Entity> =
                    matched.into_iter().skip(skip.unwrap_or(0)).collect();
                Ok(match limit {
                    Some(limit) => matched.into_iter().take(limit).collect(),
                    None => matched,
                })
            }
        }
    }

    /// Inserts a new entity through the full pipeline.
    pub async fn insert_one(&self, entity: Entity, actor: &str) -> DataResult<WriteResult> {
        let ctx = self.context(actor)?;

        let entity = self
            .hooks
            .before_validation(&ctx, entity, true, None)
            .await?;

        let mut problems =
            EntityValidator::validate(&self.entity_type, &entity, &ctx.factory).await?;
        problems.extend(self.hooks.validating(&ctx, &entity, true, None).await?);
        if !problems.is_empty() {
            return Ok(WriteResult::Invalid(problems));
        }

        let mut entity = entity;
        if !self.hooks.before_save(&ctx, &mut entity, true, None).await? {
            return Ok(WriteResult::Vetoed);
        }

        self.collection.insert_one(&entity).await?;
        self.hooks.after_save(&ctx, &entity, true).await?;

        Ok(WriteResult::Written(entity))
    }

    /// Replaces the stored entity with the given id.
    pub async fn update_one(
        &self,
        id: &str,
        entity: Entity,
        actor: &str,
    ) -> DataResult<WriteResult> {
        let Some(old) = self.collection.find_by_id(id).await? else {
            return Ok(WriteResult::NotFound);
        };

        let ctx = self.context(actor)?;

        // The path id wins over whatever the body carries.
        let mut entity = entity;
        entity.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let entity = self
            .hooks
            .before_validation(&ctx, entity, false, Some(&old))
            .await?;

        let mut problems =
            EntityValidator::validate(&self.entity_type, &entity, &ctx.factory).await?;
        problems.extend(
            self.hooks
                .validating(&ctx, &entity, false, Some(&old))
                .await?,
        );
        if !problems.is_empty() {
            return Ok(WriteResult::Invalid(problems));
        }

        let mut entity = entity;
        if !self
            .hooks
            .before_save(&ctx, &mut entity, false, Some(&old))
            .await?
        {
            return Ok(WriteResult::Vetoed);
        }

        if !self.collection.update_one(id, &entity).await? {
            return Ok(WriteResult::NotFound);
        }
        self.hooks.after_save(&ctx, &entity, false).await?;

        Ok(WriteResult::Written(entity))
    }

    /// Removes the stored entity with the given id.
    pub async fn delete_one(&self, id: &str, actor: &str) -> DataResult<DeleteResult> {
        let Some(old) = self.collection.find_by_id(id).await? else {
            return Ok(DeleteResult::NotFound);
        };

        let ctx = self.context(actor)?;

        if !self.hooks.before_delete(&ctx, &old).await? {
            return Ok(DeleteResult::Vetoed);
        }

        if !self.collection.delete_one(id).await? {
            return Ok(DeleteResult::NotFound);
        }
        self.hooks.after_delete(&ctx, &old).await?;

        Ok(DeleteResult::Deleted)
    }

    fn context(&self, actor: &str) -> DataResult<HookContext> {
        let factory = self
            .factory
            .upgrade()
            .ok_or_else(|| DataError::Internal("repository factory dropped".into()))?;

        Ok(HookContext {
            entity_type: self.entity_type.clone(),
            factory,
            actor: actor.to_string(),
        })
    }
}
