pub mod cluster;
pub mod config;
pub mod error;

// Testing utilities - available when the "testing" feature is enabled or in test mode
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cluster::{NodeId, Role, RoleState};
pub use config::{Config, SCHEMA_LOCK_KEY};
pub use error::{DspuError, Result};
