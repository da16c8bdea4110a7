//! # REST API
//!
//! One resource path per entity-type name:
//!
//! - `GET    /v1/{etName}`       list (optional `skip`/`limit`/`q` filter)
//! - `GET    /v1/{etName}/{id}`  point lookup
//! - `POST   /v1/{etName}`       insert (201 + Location)
//! - `PUT    /v1/{etName}/{id}`  full replacement
//! - `DELETE /v1/{etName}/{id}`  delete
//!
//! 404 for unknown type or id, 422 when validation yields problems, 400
//! for malformed requests, 405 for unsupported verbs, 500 otherwise.

mod errors;
mod response;
mod server;

pub use errors::{ErrorResponse, RequestError};
pub use response::{DeleteResponse, ListResponse};
pub use server::{router, serve};
