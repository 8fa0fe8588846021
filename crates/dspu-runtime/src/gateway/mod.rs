mod drain_mw;
mod handlers;
mod leader_gate;
mod response;
mod server;
mod tracing_mw;

pub use drain_mw::drain_tracking_middleware;
pub use handlers::LeaseRequest;
pub use leader_gate::{leader_gate, LeaderGateState};
pub use response::{HealthResponse, NotLeaderResponse, RoleResponse};
pub use server::{GatewayConfig, GatewayServer};
