//! dspu — a highly-available controller that elects a single leader over
//! a shared Postgres-backed store and gates mutating HTTP requests on it.

mod runtime;

pub use runtime::prelude;
pub use runtime::{Controller, ControllerBuilder};
