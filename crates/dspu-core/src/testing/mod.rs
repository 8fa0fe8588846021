//! Testing utilities for the controller.
//!
//! Provisions real Postgres databases for integration tests rather than
//! mocking the backing store — advisory locks and transaction semantics
//! are exactly the part of this system a mock would paper over.

pub mod db;

pub use db::{IsolatedTestDb, TestDatabase};
