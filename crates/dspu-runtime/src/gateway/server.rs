use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::election::ElectionHandle;
use crate::shutdown::GracefulShutdown;

use super::drain_mw::drain_tracking_middleware;
use super::handlers::{healthz_handler, leases_handler, role_handler};
use super::leader_gate::{leader_gate, LeaderGateState};
use super::tracing_mw::request_id_middleware;

/// Gateway HTTP server configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub leader_url: Option<String>,
}

/// Assembles the HTTP surface: `/healthz` and `/role` read the published
/// RoleState directly, `/v1/leases` (and any future mutating route) sits
/// behind the Leader Gate. Every route also passes through the shared
/// drain-tracking middleware, so the same [`GracefulShutdown`] the
/// binary's shutdown path drains against observes real in-flight traffic.
pub struct GatewayServer {
    config: GatewayConfig,
    election: ElectionHandle,
    shutdown: Arc<GracefulShutdown>,
}

impl GatewayServer {
    pub fn new(
        config: GatewayConfig,
        election: ElectionHandle,
        shutdown: Arc<GracefulShutdown>,
    ) -> Self {
        Self {
            config,
            election,
            shutdown,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.config.port))
    }

    /// Build the Axum router. Exposed separately from [`Self::run`] so
    /// tests can exercise it with `tower::ServiceExt::oneshot` without
    /// binding a real socket.
    pub fn router(&self) -> Router {
        let election_state = Arc::new(self.election.clone());
        let gate_state = Arc::new(LeaderGateState::new(
            self.election.clone(),
            self.config.leader_url.clone(),
        ));

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let read_only = Router::new()
            .route("/healthz", get(healthz_handler))
            .route("/role", get(role_handler))
            .with_state(election_state);

        let mutating = Router::new()
            .route("/v1/leases", post(leases_handler))
            .layer(middleware::from_fn_with_state(gate_state, leader_gate));

        // CORS runs outermost (handles preflight before anything else),
        // then request-id stamping, then drain tracking innermost so the
        // in-flight guard is held only for the span of the actual handler.
        let middleware_stack = ServiceBuilder::new()
            .layer(cors)
            .layer(middleware::from_fn(request_id_middleware))
            .layer(middleware::from_fn_with_state(
                self.shutdown.clone(),
                drain_tracking_middleware,
            ));

        read_only.merge(mutating).layer(middleware_stack)
    }

    /// Run the server until the listener is dropped (caller drives
    /// shutdown via `axum::serve(..).with_graceful_shutdown(..)` or by
    /// aborting the task this runs in).
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.addr();
        let router = self.router();
        tracing::info!(%addr, "gateway listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_binds_all_interfaces_on_configured_port() {
        let config = GatewayConfig {
            port: 18080,
            leader_url: None,
        };
        let (election_loop, election) = crate::election::ElectionLoop::new(
            "postgres://unused/unused",
            crate::election::ElectionConfig::new(
                "node-a",
                1,
                std::time::Duration::from_millis(10),
            ),
        );
        drop(election_loop);
        let shutdown = Arc::new(GracefulShutdown::new(crate::shutdown::ShutdownConfig::default()));
        let server = GatewayServer::new(config, election, shutdown);
        assert_eq!(server.addr().port(), 18080);
    }

    #[tokio::test]
    async fn requests_are_rejected_once_shutdown_is_requested() {
        use tower::ServiceExt;

        let config = GatewayConfig {
            port: 0,
            leader_url: None,
        };
        let (election_loop, election) = crate::election::ElectionLoop::new(
            "postgres://unused/unused",
            crate::election::ElectionConfig::new(
                "node-a",
                1,
                std::time::Duration::from_millis(10),
            ),
        );
        drop(election_loop);
        let shutdown = Arc::new(GracefulShutdown::new(crate::shutdown::ShutdownConfig::default()));
        let server = GatewayServer::new(config, election, shutdown.clone());
        let router = server.router();

        let before = router
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/healthz")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(before.status(), axum::http::StatusCode::OK);

        shutdown.drain().await;

        let after = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/healthz")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(after.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }
}
