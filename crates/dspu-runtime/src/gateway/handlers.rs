use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::election::ElectionHandle;

use super::response::{HealthResponse, RoleResponse};

/// `GET /healthz` — liveness probe. Never gates on role.
pub async fn healthz_handler(State(election): State<Arc<ElectionHandle>>) -> Json<HealthResponse> {
    let state = election.role_state();
    Json(HealthResponse::from(&state))
}

/// `GET /role` — role introspection.
pub async fn role_handler(State(election): State<Arc<ElectionHandle>>) -> Json<RoleResponse> {
    let state = election.role_state();
    Json(RoleResponse::from(&state))
}

/// Body of `POST /v1/leases`. Deserialised so malformed JSON gets a free
/// `400` from the extractor, but not otherwise validated — the endpoint is
/// a stand-in for "any future mutating endpoint" behind the Leader Gate,
/// not a real lease-allocation API.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct LeaseRequest {
    pub agent: String,
    pub capabilities: Vec<String>,
}

/// `POST /v1/leases` — reached only when the Leader Gate has already let
/// the request through.
pub async fn leases_handler(Json(_req): Json<LeaseRequest>) -> StatusCode {
    StatusCode::NO_CONTENT
}
