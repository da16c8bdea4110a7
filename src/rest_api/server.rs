//! # REST API HTTP Server
//!
//! Axum router over the repository factory. Handlers translate transport
//! concerns and delegate everything else to the repositories.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServerConfig;
use crate::metadata::Entity;
use crate::observability::{Event, Logger};
use crate::repository::{DeleteResult, RepositoryFactory, WriteResult};
use crate::specification;

use super::errors::RequestError;
use super::response::{DeleteResponse, ListResponse};

/// Shared handler state
type ApiState = Arc<RepositoryFactory>;

/// Builds the router over a repository factory.
pub fn router(factory: Arc<RepositoryFactory>) -> Router {
    Router::new()
        .route("/v1", get(no_entity_type))
        .route(
            "/v1/:et_name",
            get(list_handler).post(insert_handler),
        )
        .route(
            "/v1/:et_name/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .fallback(method_not_allowed)
        .with_state(factory)
}

/// Binds and serves until the process is stopped.
pub async fn serve(factory: Arc<RepositoryFactory>, config: &ServerConfig) -> std::io::Result<()> {
    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = router(factory).layer(cors);
    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;

    Logger::info(
        Event::ServerListening,
        &[("addr", &config.socket_addr())],
    );

    axum::serve(listener, app).await
}

async fn no_entity_type() -> RequestError {
    RequestError::NoEntityTypeSpecified
}

async fn method_not_allowed() -> RequestError {
    RequestError::MethodNotAllowed
}

/// The acting identity, taken from the x-actor header.
fn actor(headers: &HeaderMap) -> String {
    headers
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

fn parse_paging(
    params: &HashMap<String, String>,
) -> Result<(Option<usize>, Option<usize>), RequestError> {
    let parse = |key: &str| -> Result<Option<usize>, RequestError> {
        match params.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| RequestError::MalformedQuery(format!("'{}' must be an integer", key))),
        }
    };
    Ok((parse("skip")?, parse("limit")?))
}

fn body_object(body: Value) -> Result<Entity, RequestError> {
    match body {
        Value::Object(entity) => Ok(entity),
        other => Err(RequestError::MalformedBody(format!(
            "expected a JSON object, got {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                Value::String(_) => "a string",
                Value::Array(_) => "an array",
                Value::Object(_) => unreachable!(),
            }
        ))),
    }
}

/// List entities, optionally filtered by the `q` specification.
async fn list_handler(
    State(factory): State<ApiState>,
    Path(et_name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse>, RequestError> {
    let (skip, limit) = parse_paging(&params)?;

    let predicate = match params.get("q") {
        None => None,
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|err| RequestError::MalformedQuery(err.to_string()))?;
            Some(
                specification::parse(&value)
                    .map_err(|err| RequestError::MalformedQuery(err.to_string()))?,
            )
        }
    };

    let repository = factory.by_name(&et_name).await?;
    let entities = repository.find_many(predicate.as_ref(), skip, limit).await?;

    let data = entities.into_iter().map(Value::Object).collect();
    Ok(Json(ListResponse::new(data, skip.unwrap_or(0), limit)))
}

/// Point lookup by id.
async fn get_handler(
    State(factory): State<ApiState>,
    Path((et_name, id)): Path<(String, String)>,
) -> Result<Json<Value>, RequestError> {
    let repository = factory.by_name(&et_name).await?;

    match repository.find_by_id(&id).await? {
        Some(entity) => Ok(Json(Value::Object(entity))),
        None => Err(RequestError::EntityNotFound {
            entity_type: et_name,
            id,
        }),
    }
}

/// Insert; answers 201 with a Location header.
async fn insert_handler(
    State(factory): State<ApiState>,
    Path(et_name): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, RequestError> {
    let entity = body_object(body)?;
    let repository = factory.by_name(&et_name).await?;

    match repository.insert_one(entity, &actor(&headers)).await? {
        WriteResult::Written(entity) => {
            let id = entity
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let location = format!("/v1/{}/{}", et_name, id);
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(Value::Object(entity)),
            )
                .into_response())
        }
        WriteResult::Invalid(problems) => Err(RequestError::Validation(problems)),
        // A veto writes nothing; the empty body is the signal.
        WriteResult::Vetoed => Ok(Json(Value::Null).into_response()),
        WriteResult::NotFound => Err(RequestError::EntityNotFound {
            entity_type: et_name,
            id: String::new(),
        }),
    }
}

/// Full replacement of the entity with the given id.
async fn update_handler(
    State(factory): State<ApiState>,
    Path((et_name, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, RequestError> {
    let entity = body_object(body)?;
    let repository = factory.by_name(&et_name).await?;

    match repository.update_one(&id, entity, &actor(&headers)).await? {
        WriteResult::Written(entity) => Ok(Json(Value::Object(entity)).into_response()),
        WriteResult::Invalid(problems) => Err(RequestError::Validation(problems)),
        WriteResult::Vetoed => Ok(Json(Value::Null).into_response()),
        WriteResult::NotFound => Err(RequestError::EntityNotFound {
            entity_type: et_name,
            id,
        }),
    }
}

/// Delete by id.
async fn delete_handler(
    State(factory): State<ApiState>,
    Path((et_name, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, RequestError> {
    let repository = factory.by_name(&et_name).await?;

    match repository.delete_one(&id, &actor(&headers)).await? {
        DeleteResult::Deleted => Ok(Json(DeleteResponse::success())),
        DeleteResult::Vetoed => Ok(Json(DeleteResponse::vetoed())),
        DeleteResult::NotFound => Err(RequestError::EntityNotFound {
            entity_type: et_name,
            id,
        }),
    }
}
