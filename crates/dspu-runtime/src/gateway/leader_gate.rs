use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::election::ElectionHandle;

use super::response::NotLeaderResponse;

/// State backing the Leader Gate middleware: a read-only handle to the
/// election loop's published [`dspu_core::cluster::RoleState`], plus the
/// configured `LEADER_URL` to advertise on rejection.
#[derive(Clone)]
pub struct LeaderGateState {
    election: ElectionHandle,
    leader_url: Option<String>,
}

impl LeaderGateState {
    pub fn new(election: ElectionHandle, leader_url: Option<String>) -> Self {
        Self {
            election,
            leader_url,
        }
    }
}

/// Gates every mutating route: serves the request only when the current
/// RoleState snapshot reports LEADER, otherwise rejects with `409
/// NOT_LEADER`. Never suspends on election state — it reads whatever
/// snapshot is currently published and returns immediately.
pub async fn leader_gate(
    State(state): State<Arc<LeaderGateState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let role_state = state.election.role_state();
    if role_state.is_leader() {
        next.run(req).await
    } else {
        NotLeaderResponse::new(&role_state, state.leader_url.clone()).into_response()
    }
}
