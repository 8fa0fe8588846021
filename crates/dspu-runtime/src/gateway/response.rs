use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use dspu_core::cluster::{Role, RoleState};
use dspu_core::error::DspuError;

/// Body of `GET /healthz`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub role: Role,
    pub leader_epoch: Option<i64>,
    pub leader_id: Option<String>,
}

impl From<&RoleState> for HealthResponse {
    fn from(state: &RoleState) -> Self {
        Self {
            ok: true,
            role: state.role,
            leader_epoch: state.leader_epoch,
            leader_id: state.leader_id.clone(),
        }
    }
}

/// Body of `GET /role`.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub node_id: String,
    pub role: Role,
    pub leader_epoch: Option<i64>,
    pub leader_id: Option<String>,
}

impl From<&RoleState> for RoleResponse {
    fn from(state: &RoleState) -> Self {
        Self {
            node_id: state.node_id.to_string(),
            role: state.role,
            leader_epoch: state.leader_epoch,
            leader_id: state.leader_id.clone(),
        }
    }
}

/// Body and headers returned by the Leader Gate when the responding
/// process is not LEADER. Status is always `409`.
#[derive(Debug, Serialize)]
pub struct NotLeaderResponse {
    pub error: &'static str,
    pub leader_id: Option<String>,
    pub leader_url: Option<String>,
    pub leader_epoch: Option<i64>,
    pub node_id: String,
    pub role: Role,
}

impl NotLeaderResponse {
    pub fn new(state: &RoleState, leader_url: Option<String>) -> Self {
        Self {
            error: "NOT_LEADER",
            leader_id: state.leader_id.clone(),
            leader_url,
            leader_epoch: state.leader_epoch,
            node_id: state.node_id.to_string(),
            role: Role::Standby,
        }
    }
}

impl IntoResponse for NotLeaderResponse {
    fn into_response(self) -> Response {
        let epoch_header = self
            .leader_epoch
            .map(|e| e.to_string())
            .unwrap_or_default();
        let leader_id_header = self.leader_id.clone().unwrap_or_default();

        let mut response = (StatusCode::CONFLICT, Json(self)).into_response();
        if let Ok(value) = HeaderValue::from_str(&epoch_header) {
            response
                .headers_mut()
                .insert("x-dspu-leader-epoch", value);
        }
        if let Ok(value) = HeaderValue::from_str(&leader_id_header) {
            response.headers_mut().insert("x-dspu-leader-id", value);
        }
        response
    }
}

/// Generic error envelope. Every [`DspuError`] variant that can reach a
/// handler (anything besides the Leader Gate's own `NotLeaderResponse`)
/// maps to `500 INTERNAL` with no underlying detail in the body — the
/// taxonomy's `NOT_LEADER` is handled separately since it needs the
/// fencing payload, not this generic shape.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for DspuError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request handling failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: "INTERNAL" }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dspu_core::cluster::NodeId;

    #[test]
    fn not_leader_response_carries_standby_role() {
        let state = RoleState {
            node_id: NodeId::new("node-b"),
            role: Role::Standby,
            leader_epoch: Some(1),
            leader_id: Some("node-a".to_string()),
        };
        let body = NotLeaderResponse::new(&state, Some("http://node-a:8080".to_string()));
        assert_eq!(body.error, "NOT_LEADER");
        assert_eq!(body.role, Role::Standby);
        assert_eq!(body.leader_epoch, Some(1));
        assert_eq!(body.leader_id.as_deref(), Some("node-a"));
    }

    #[test]
    fn internal_error_maps_to_500_without_detail() {
        let response = DspuError::Internal("leaked connection string".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
