//! Recursive schema construction from entity-type metadata
//!
//! One strategy per property kind, dispatched exhaustively. Linked and
//! abstract entities resolve the referenced type through a [`TypeResolver`]
//! and recurse back into the top-level dispatcher for each denormalized
//! property, so links to links build correctly.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use regex::Regex;

use crate::metadata::{EntityType, EntityTypeRef, Validation, ValidationKind};

use super::errors::{SchemaError, SchemaResult};
use super::types::{Schema, SchemaProperty};

/// Lookup capability for referenced entity types.
#[async_trait]
pub trait TypeResolver: Send + Sync {
    /// Fetch an entity type by id. `None` means the id is unknown.
    async fn resolve_type(&self, id: &str) -> SchemaResult<Option<EntityType>>;
}

/// Builds executable schemas from entity-type metadata.
pub struct EntitySchemaBuilder<'a, R: TypeResolver> {
    resolver: &'a R,
}

impl<'a, R: TypeResolver> EntitySchemaBuilder<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Builds the root schema for an entity type.
    ///
    /// Unknown keys are rejected. Properties are attached in declaration
    /// order; a property is required when its validation says so or when it
    /// is a boolean (false must be distinguishable from absent).
    pub async fn build_schema(&self, entity_type: &EntityType) -> SchemaResult<Schema> {
        let mut properties = Vec::with_capacity(entity_type.properties.len());

        for prop in &entity_type.properties {
            let schema = self.build_property_schema(&prop.validation).await?;
            let required =
                prop.validation.required || matches!(prop.validation.kind, ValidationKind::Boolean);

            properties.push(SchemaProperty {
                name: prop.name.clone(),
                required,
                schema,
            });
        }

        Ok(Schema::strict_object(properties))
    }

    /// Builds the sub-schema for a single validation specification.
    ///
    /// This is the recursive entry point: array and linked strategies call
    /// back into it for their element and denormalized-property schemas.
    pub fn build_property_schema<'b>(
        &'b self,
        validation: &'b Validation,
    ) -> BoxFuture<'b, SchemaResult<Schema>> {
        Box::pin(async move {
            match &validation.kind {
                ValidationKind::String {
                    pattern,
                    base64_encoded,
                } => {
                    if let Some(pattern) = pattern {
                        Regex::new(pattern)
                            .map_err(|_| SchemaError::invalid_pattern(pattern.clone()))?;
                    }
                    Ok(Schema::String {
                        pattern: pattern.clone(),
                        base64_encoded: *base64_encoded,
                    })
                }

                ValidationKind::Number {
                    min,
                    max,
                    multiple_of,
                } => Ok(Schema::Number {
                    min: *min,
                    max: *max,
                    multiple_of: *multiple_of,
                }),

                ValidationKind::Int {
                    min,
                    max,
                    multiple_of,
                } => Ok(Schema::Integer {
                    min: *min,
                    max: *max,
                    multiple_of: *multiple_of,
                }),

                ValidationKind::Boolean => Ok(Schema::Boolean),

                ValidationKind::DateTime => Ok(Schema::DateTime),

                ValidationKind::Enum { values } => Ok(Schema::Enum {
                    values: values.clone(),
                }),

                ValidationKind::Array {
                    items,
                    unique_items,
                } => {
                    let element = self.build_property_schema(items).await?;
                    Ok(Schema::Array {
                        items: Box::new(element),
                        unique_items: *unique_items,
                    })
                }

                ValidationKind::LinkedEntity {
                    reference,
                    linked_properties,
                } => {
                    self.build_linked_schema(reference, linked_properties, false)
                        .await
                }

                ValidationKind::AbstractEntity {
                    reference,
                    linked_properties,
                } => {
                    // Tolerant of any concrete subtype shape: the subset is
                    // still checked, unknown keys are allowed.
                    self.build_linked_schema(reference, linked_properties, true)
                        .await
                }

                ValidationKind::Any => Ok(Schema::Any),
            }
        })
    }

    /// Builds an object schema containing only the denormalized properties
    /// of a linked entity type.
    async fn build_linked_schema(
        &self,
        reference: &EntityTypeRef,
        linked_properties: &[String],
        additional_properties: bool,
    ) -> SchemaResult<Schema> {
        let target = self
            .resolver
            .resolve_type(&reference.id)
            .await?
            .ok_or_else(|| SchemaError::linked_type_not_found(reference.name.clone()))?;

        let mut properties = Vec::with_capacity(linked_properties.len());

        for name in linked_properties {
            let found = target
                .property(name)
                .ok_or_else(|| SchemaError::linked_property_unknown(&target.name, name))?;

            let schema = self.build_property_schema(&found.validation).await?;
            properties.push(SchemaProperty {
                name: found.name.clone(),
                required: found.validation.required,
                schema,
            });
        }

        Ok(Schema::Object {
            properties,
            additional_properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EntityProperty;
    use std::collections::HashMap;

    struct MapResolver {
        types: HashMap<String, EntityType>,
    }

    impl MapResolver {
        fn with(types: Vec<EntityType>) -> Self {
            Self {
                types: types.into_iter().map(|t| (t.id.clone(), t)).collect(),
            }
        }
    }

    #[async_trait]
    impl TypeResolver for MapResolver {
        async fn resolve_type(&self, id: &str) -> SchemaResult<Option<EntityType>> {
            Ok(self.types.get(id).cloned())
        }
    }

    fn string_prop(name: &str, required: bool) -> EntityProperty {
        let kind = ValidationKind::String {
            pattern: None,
            base64_encoded: false,
        };
        EntityProperty {
            name: name.into(),
            validation: if required {
                Validation::required(kind)
            } else {
                Validation::of(kind)
            },
        }
    }

    fn customer_type() -> EntityType {
        EntityType {
            id: "et-customer".into(),
            name: "customer".into(),
            label: None,
            is_abstract: false,
            properties: vec![string_prop("_id", true), string_prop("name", true)],
        }
    }

    #[tokio::test]
    async fn test_boolean_is_always_required() {
        let resolver = MapResolver::with(vec![]);
        let builder = EntitySchemaBuilder::new(&resolver);

        let entity_type = EntityType {
            id: "et-flag".into(),
            name: "flag".into(),
            label: None,
            is_abstract: false,
            properties: vec![EntityProperty {
                name: "active".into(),
                validation: Validation::of(ValidationKind::Boolean),
            }],
        };

        let schema = builder.build_schema(&entity_type).await.unwrap();
        match schema {
            Schema::Object { properties, .. } => {
                assert!(properties[0].required);
            }
            other => panic!("unexpected schema {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_linked_schema_contains_only_linked_properties() {
        let resolver = MapResolver::with(vec![customer_type()]);
        let builder = EntitySchemaBuilder::new(&resolver);

        let validation = Validation::of(ValidationKind::LinkedEntity {
            reference: EntityTypeRef {
                id: "et-customer".into(),
                name: "customer".into(),
            },
            linked_properties: vec!["_id".into()],
        });

        let schema = builder.build_property_schema(&validation).await.unwrap();
        match schema {
            Schema::Object {
                properties,
                additional_properties,
            } => {
                assert!(!additional_properties);
                assert_eq!(properties.len(), 1);
                assert_eq!(properties[0].name, "_id");
            }
            other => panic!("unexpected schema {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_linked_property_is_a_build_failure() {
        let resolver = MapResolver::with(vec![customer_type()]);
        let builder = EntitySchemaBuilder::new(&resolver);

        let validation = Validation::of(ValidationKind::LinkedEntity {
            reference: EntityTypeRef {
                id: "et-customer".into(),
                name: "customer".into(),
            },
            linked_properties: vec!["tier".into()],
        });

        let err = builder
            .build_property_schema(&validation)
            .await
            .unwrap_err();
        assert_eq!(err.code().code(), "PROTEAN_LINKED_PROPERTY_UNKNOWN");
        assert_eq!(err.property(), Some("tier"));
    }

    #[tokio::test]
    async fn test_unknown_linked_type_is_a_build_failure() {
        let resolver = MapResolver::with(vec![]);
        let builder = EntitySchemaBuilder::new(&resolver);

        let validation = Validation::of(ValidationKind::LinkedEntity {
            reference: EntityTypeRef {
                id: "et-ghost".into(),
                name: "ghost".into(),
            },
            linked_properties: vec![],
        });

        let err = builder
            .build_property_schema(&validation)
            .await
            .unwrap_err();
        assert_eq!(err.code().code(), "PROTEAN_LINKED_TYPE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_abstract_entity_allows_unknown_keys() {
        let resolver = MapResolver::with(vec![customer_type()]);
        let builder = EntitySchemaBuilder::new(&resolver);

        let validation = Validation::of(ValidationKind::AbstractEntity {
            reference: EntityTypeRef {
                id: "et-customer".into(),
                name: "customer".into(),
            },
            linked_properties: vec!["_id".into()],
        });

        let schema = builder.build_property_schema(&validation).await.unwrap();
        match schema {
            Schema::Object {
                additional_properties,
                ..
            } => assert!(additional_properties),
            other => panic!("unexpected schema {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_bounds_are_kept() {
        let resolver = MapResolver::with(vec![]);
        let builder = EntitySchemaBuilder::new(&resolver);

        let validation = Validation::of(ValidationKind::Int {
            min: Some(0),
            max: Some(0),
            multiple_of: None,
        });

        let schema = builder.build_property_schema(&validation).await.unwrap();
        assert_eq!(
            schema,
            Schema::Integer {
                min: Some(0),
                max: Some(0),
                multiple_of: None,
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_a_build_failure() {
        let resolver = MapResolver::with(vec![]);
        let builder = EntitySchemaBuilder::new(&resolver);

        let validation = Validation::of(ValidationKind::String {
            pattern: Some("([".into()),
            base64_encoded: false,
        });

        let err = builder
            .build_property_schema(&validation)
            .await
            .unwrap_err();
        assert_eq!(err.code().code(), "PROTEAN_INVALID_PATTERN");
    }

    #[tokio::test]
    async fn test_array_recurses_into_items() {
        let resolver = MapResolver::with(vec![]);
        let builder = EntitySchemaBuilder::new(&resolver);

        let validation = Validation::of(ValidationKind::Array {
            items: Box::new(Validation::of(ValidationKind::Enum {
                values: vec!["a".into(), "b".into()],
            })),
            unique_items: true,
        });

        let schema = builder.build_property_schema(&validation).await.unwrap();
        match schema {
            Schema::Array {
                items,
                unique_items,
            } => {
                assert!(unique_items);
                assert_eq!(
                    *items,
                    Schema::Enum {
                        values: vec!["a".into(), "b".into()]
                    }
                );
            }
            other => panic!("unexpected schema {:?}", other),
        }
    }
}
