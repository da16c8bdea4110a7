//! Entity normalization helpers
//!
//! Applied by the standard hooks before validation: identity assignment,
//! declared defaults, naming conventions, date-time coercion and audit
//! stamping. Helpers only ever touch top-level properties declared on the
//! entity type; they never remove caller data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::metadata::builtin::{CHANGED_AT, CHANGED_BY, CREATED_AT, CREATED_BY, ID_FIELD};
use crate::metadata::{Entity, EntityType, ValidationKind};

/// Assigns a fresh identity when the document has none.
pub fn ensure_id(entity: &mut Entity) {
    let missing = match entity.get(ID_FIELD) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };
    if missing {
        entity.insert(
            ID_FIELD.to_string(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );
    }
}

/// Fills in declared default values for absent properties.
pub fn apply_defaults(entity: &mut Entity, entity_type: &EntityType) {
    for prop in &entity_type.properties {
        if let Some(default) = &prop.validation.default {
            if !entity.contains_key(&prop.name) {
                entity.insert(prop.name.clone(), default.clone());
            }
        }
    }
}

/// Applies declared naming conventions to string values.
pub fn apply_conventions(entity: &mut Entity, entity_type: &EntityType) {
    for prop in &entity_type.properties {
        let Some(convention) = &prop.validation.convention else {
            continue;
        };
        if let Some(Value::String(s)) = entity.get(&prop.name) {
            let formatted = convention.apply(s);
            entity.insert(prop.name.clone(), Value::String(formatted));
        }
    }
}

/// Rewrites date-time-shaped string values into canonical RFC 3339.
/// Unparseable values are left alone for the schema engine to flag.
pub fn coerce_date_times(entity: &mut Entity, entity_type: &EntityType) {
    for prop in &entity_type.properties {
        if !matches!(prop.validation.kind, ValidationKind::DateTime) {
            continue;
        }
        let Some(Value::String(s)) = entity.get(&prop.name) else {
            continue;
        };
        if let Some(canonical) = parse_date_time(s) {
            entity.insert(prop.name.clone(), Value::String(canonical));
        }
    }
}

/// Stamps identity and the four audit fields on a new document.
pub fn stamp_insert(entity: &mut Entity, actor: &str) {
    let now = Utc::now().to_rfc3339();
    entity.insert(CREATED_AT.to_string(), Value::String(now.clone()));
    entity.insert(CREATED_BY.to_string(), Value::String(actor.to_string()));
    entity.insert(CHANGED_AT.to_string(), Value::String(now));
    entity.insert(CHANGED_BY.to_string(), Value::String(actor.to_string()));
}

/// Re-stamps the changed fields and carries creation audit forward from the
/// stored version.
pub fn stamp_update(entity: &mut Entity, old: &Entity, actor: &str) {
    for field in [CREATED_AT, CREATED_BY] {
        if let Some(value) = old.get(field) {
            entity.insert(field.to_string(), value.clone());
        }
    }
    entity.insert(
        CHANGED_AT.to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    entity.insert(CHANGED_BY.to_string(), Value::String(actor.to_string()));
}

fn parse_date_time(s: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).to_rfc3339());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().to_rfc3339());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().to_rfc3339());
    }
    None
}
