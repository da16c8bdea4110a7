//! HTTP surface contract: status codes, Location header, validation
//! problem bodies, and the q/skip/limit query path.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use proteandb::bootstrap;
use proteandb::metadata::Entity;
use proteandb::repository::{RepositoryFactory, WriteResult};
use proteandb::rest_api;
use proteandb::storage::{DataStore, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn setup() -> (Router, Arc<RepositoryFactory>) {
    let store: Arc<dyn DataStore> = MemoryStore::new();
    bootstrap::populate(&store).await.unwrap();
    let factory = RepositoryFactory::new(store);
    (rest_api::router(factory.clone()), factory)
}

fn doc(value: Value) -> Entity {
    value.as_object().unwrap().clone()
}

async fn seed_customer_type(factory: &Arc<RepositoryFactory>) {
    let types = factory.by_name("entity_type").await.unwrap();
    let result = types
        .insert_one(
            doc(json!({
                "name": "customer",
                "label": "Customer",
                "properties": [
                    { "name": "name", "validation": { "type": "string", "required": true } },
                    { "name": "tier", "validation": {
                        "type": "enum", "enum": ["basic", "premium"], "default": "basic"
                    } }
                ]
            })),
            "seeder",
        )
        .await
        .unwrap();
    assert!(matches!(result, WriteResult::Written(_)));
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-actor", "rest-tester")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn missing_entity_type_is_bad_request() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, get("/v1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PROTEAN_NO_ENTITY_TYPE");
}

#[tokio::test]
async fn unknown_entity_type_is_not_found() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, get("/v1/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PROTEAN_ENTITY_TYPE_NOT_FOUND");
}

#[tokio::test]
async fn insert_answers_created_with_location() {
    let (app, factory) = setup().await;
    seed_customer_type(&factory).await;

    let response = app
        .clone()
        .oneshot(post("/v1/customer", json!({ "name": "Alice" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let id = body["_id"].as_str().unwrap();
    assert_eq!(location, format!("/v1/customer/{}", id));
    assert_eq!(body["created_by"], "rest-tester");

    // Round-trip through the read path.
    let (status, fetched) = send(&app, get(&location)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn invalid_entities_answer_unprocessable_with_problems() {
    let (app, factory) = setup().await;
    seed_customer_type(&factory).await;

    let (status, body) = send(&app, post("/v1/customer", json!({ "tier": "gold" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "PROTEAN_VALIDATION_FAILED");
    assert!(!body["problems"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn non_object_bodies_are_bad_requests() {
    let (app, factory) = setup().await;
    seed_customer_type(&factory).await;

    let (status, body) = send(&app, post("/v1/customer", json!([1, 2, 3]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PROTEAN_MALFORMED_BODY");
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (app, factory) = setup().await;
    seed_customer_type(&factory).await;

    let (status, body) = send(&app, get("/v1/customer/no-such-id")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PROTEAN_ENTITY_NOT_FOUND");
}

#[tokio::test]
async fn list_supports_query_specification_and_paging() {
    let (app, factory) = setup().await;
    seed_customer_type(&factory).await;

    for (name, tier) in [("Alice", "premium"), ("Bob", "basic"), ("Carol", "premium")] {
        let (status, _) = send(
            &app,
            post("/v1/customer", json!({ "name": name, "tier": tier })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/v1/customer")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let q = json!({ "member": "tier", "operator": "==", "value": "premium" }).to_string();
    let encoded: String = q
        .chars()
        .map(|c| match c {
            '"' => "%22".to_string(),
            '{' => "%7B".to_string(),
            '}' => "%7D".to_string(),
            ' ' => "%20".to_string(),
            c => c.to_string(),
        })
        .collect();

    let (status, body) = send(&app, get(&format!("/v1/customer?q={}", encoded))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Carol"]);

    let (status, body) = send(&app, get("/v1/customer?skip=1&limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Bob");

    let (status, body) = send(&app, get("/v1/customer?skip=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PROTEAN_MALFORMED_QUERY");
}

#[tokio::test]
async fn update_replaces_and_missing_update_target_is_not_found() {
    let (app, factory) = setup().await;
    seed_customer_type(&factory).await;

    let (_, created) = send(&app, post("/v1/customer", json!({ "name": "Alice" }))).await;
    let id = created["_id"].as_str().unwrap();

    let mut replacement = created.clone();
    replacement["name"] = json!("Alicia");
    let (status, body) = send(&app, put(&format!("/v1/customer/{}", id), replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alicia");

    let (status, _) = send(
        &app,
        put("/v1/customer/no-such-id", json!({ "name": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_answers_deleted_then_not_found() {
    let (app, factory) = setup().await;
    seed_customer_type(&factory).await;

    let (_, created) = send(&app, post("/v1/customer", json!({ "name": "Alice" }))).await;
    let id = created["_id"].as_str().unwrap();

    let (status, body) = send(&app, delete(&format!("/v1/customer/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = send(&app, delete(&format!("/v1/customer/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unmatched_routes_are_method_not_allowed() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, get("/v2/anything")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "PROTEAN_METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn entity_types_are_managed_through_the_same_surface() {
    let (app, _) = setup().await;

    // Define a brand-new type over HTTP...
    let (status, created_type) = send(
        &app,
        post(
            "/v1/entity_type",
            json!({
                "name": "ticket",
                "properties": [
                    { "name": "subject", "validation": { "type": "string", "required": true } },
                    { "name": "open", "validation": { "type": "boolean" } }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created_type["name"], "ticket");

    // ...then store an instance of it. Booleans are never omittable.
    let (status, body) = send(&app, post("/v1/ticket", json!({ "subject": "hello" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let problems = body["problems"].as_array().unwrap();
    assert!(problems
        .iter()
        .any(|p| p["property"] == "open" && p["kind"] == "required"));

    let (status, ticket) = send(
        &app,
        post("/v1/ticket", json!({ "subject": "hello", "open": false })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["open"], false);
}
