//! Built-in entity types and system property definitions
//!
//! The store bootstraps with two well-known types: `entity_type` (the type
//! that describes entity types, including itself) and `entity_schema` (the
//! persisted built-schema cache). Every entity type carries the five system
//! properties defined here; the entity-type repository splices them into
//! newly inserted types.

use serde_json::json;

use super::{EntityProperty, EntityType, Validation, ValidationKind};

/// Collection and type name for entity types.
pub const ENTITY_TYPE: &str = "entity_type";
/// Collection and type name for persisted schemas.
pub const ENTITY_SCHEMA: &str = "entity_schema";

/// Fixed id of the `entity_type` type document.
pub const ENTITY_TYPE_ID: &str = "sys-entity-type";
/// Fixed id of the `entity_schema` type document.
pub const ENTITY_SCHEMA_ID: &str = "sys-entity-schema";

/// Document identity field.
pub const ID_FIELD: &str = "_id";
/// System audit fields maintained by the repository.
pub const CREATED_AT: &str = "created_at";
pub const CREATED_BY: &str = "created_by";
pub const CHANGED_AT: &str = "changed_at";
pub const CHANGED_BY: &str = "changed_by";

/// The five property definitions present on every entity type.
pub fn system_properties() -> Vec<EntityProperty> {
    vec![
        EntityProperty {
            name: ID_FIELD.into(),
            validation: Validation::required(ValidationKind::String {
                pattern: None,
                base64_encoded: false,
            }),
        },
        EntityProperty {
            name: CREATED_AT.into(),
            validation: Validation::required(ValidationKind::DateTime),
        },
        EntityProperty {
            name: CREATED_BY.into(),
            validation: Validation::required(ValidationKind::String {
                pattern: None,
                base64_encoded: false,
            }),
        },
        EntityProperty {
            name: CHANGED_AT.into(),
            validation: Validation::required(ValidationKind::DateTime),
        },
        EntityProperty {
            name: CHANGED_BY.into(),
            validation: Validation::required(ValidationKind::String {
                pattern: None,
                base64_encoded: false,
            }),
        },
    ]
}

/// The self-describing `entity_type` type.
pub fn entity_type_type() -> EntityType {
    let mut properties = system_properties();
    properties.push(EntityProperty {
        name: "name".into(),
        validation: Validation::required(ValidationKind::String {
            pattern: Some("^[a-z][a-z0-9_]*$".into()),
            base64_encoded: false,
        }),
    });
    properties.push(EntityProperty {
        name: "label".into(),
        validation: Validation::of(ValidationKind::String {
            pattern: None,
            base64_encoded: false,
        }),
    });
    properties.push(EntityProperty {
        name: "abstract".into(),
        validation: Validation {
            kind: ValidationKind::Boolean,
            required: false,
            default: Some(json!(false)),
            convention: None,
        },
    });
    properties.push(EntityProperty {
        name: "properties".into(),
        validation: Validation::required(ValidationKind::Array {
            items: Box::new(Validation::of(ValidationKind::Any)),
            unique_items: false,
        }),
    });

    EntityType {
        id: ENTITY_TYPE_ID.into(),
        name: ENTITY_TYPE.into(),
        label: Some("Entity Type".into()),
        is_abstract: false,
        properties,
    }
}

/// The `entity_schema` type holding serialized built schemas keyed by
/// entity-type id.
pub fn entity_schema_type() -> EntityType {
    let mut properties = system_properties();
    properties.push(EntityProperty {
        name: "schema".into(),
        validation: Validation::required(ValidationKind::String {
            pattern: None,
            base64_encoded: false,
        }),
    });

    EntityType {
        id: ENTITY_SCHEMA_ID.into(),
        name: ENTITY_SCHEMA.into(),
        label: Some("Entity Schema".into()),
        is_abstract: false,
        properties,
    }
}
