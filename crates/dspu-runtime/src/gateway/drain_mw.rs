use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::shutdown::{GracefulShutdown, InFlightGuard};

/// Holds one [`InFlightGuard`] for the duration of the request, so
/// [`GracefulShutdown::drain`] observes real traffic instead of an
/// always-empty counter. Requests that arrive after shutdown has been
/// requested are rejected with `503` rather than counted.
pub async fn drain_tracking_middleware(
    State(shutdown): State<Arc<GracefulShutdown>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match InFlightGuard::try_new(shutdown) {
        Some(_guard) => next.run(req).await,
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
