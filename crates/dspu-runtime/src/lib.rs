pub mod db;
pub mod election;
pub mod gateway;
pub mod schema;
pub mod shutdown;

pub use db::Database;
pub use election::{ElectionConfig, ElectionHandle, ElectionLoop};
pub use gateway::{GatewayConfig, GatewayServer};
pub use shutdown::{GracefulShutdown, InFlightGuard, ShutdownConfig};
