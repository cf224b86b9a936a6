//! Identifier derivation endpoints
//!
//! `POST /`, `POST /:field` and `POST /:field/:namespace` receive a JSON
//! array of objects and respond with the same array, the designated fields
//! rewritten to UUIDv5 identifiers. The field segment may carry several
//! `;`-separated field specifications; the namespace segment defaults to
//! `rdf:type` (infer from the entity) and may be blank (`%20`) to force
//! derivation without a namespace.

use crate::error::{Result, ServerError};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use cimrdf_core::entity::strip_internal;
use cimrdf_core::Warnings;
use serde_json::Value;
use std::sync::Arc;

/// Field specification applied when the path names none.
const DEFAULT_FIELD: &str = "_id";

/// Namespace specification applied when the path names none.
const DEFAULT_NAMESPACE: &str = "rdf:type";

/// POST / - derive the identity field under the rdf:type namespace
pub async fn derive_default(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response> {
    derive_entities(&state, DEFAULT_FIELD, DEFAULT_NAMESPACE, &body)
}

/// POST /:field - derive the given fields under the rdf:type namespace
pub async fn derive_field(
    State(state): State<Arc<AppState>>,
    Path(field): Path<String>,
    body: Bytes,
) -> Result<Response> {
    derive_entities(&state, &field, DEFAULT_NAMESPACE, &body)
}

/// POST /:field/:namespace - derive the given fields under the given namespace
pub async fn derive_field_namespace(
    State(state): State<Arc<AppState>>,
    Path((field, namespace)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response> {
    derive_entities(&state, &field, &namespace, &body)
}

fn derive_entities(
    state: &AppState,
    field_spec: &str,
    namespace_spec: &str,
    body: &[u8],
) -> Result<Response> {
    if body.is_empty() {
        return Err(ServerError::bad_request("missing JSON array of entities"));
    }

    let batch: Value = serde_json::from_slice(body)?;
    let Value::Array(elements) = batch else {
        return Err(ServerError::bad_request("expected a JSON array of entities"));
    };

    let mut warnings = Warnings::new();
    let mut result = Vec::with_capacity(elements.len());
    for element in elements {
        let Value::Object(mut entity) = element else {
            return Err(ServerError::bad_request(
                "expected JSON object inside array",
            ));
        };
        state
            .deriver
            .derive_entity(&mut entity, field_spec, namespace_spec, &mut warnings);
        strip_internal(&mut entity);
        result.push(Value::Object(entity));
    }

    let payload = serde_json::to_string(&Value::Array(result))
        .map_err(|e| ServerError::internal(format!("serializing result: {e}")))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        payload,
    )
        .into_response())
}
