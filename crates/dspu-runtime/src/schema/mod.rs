mod init;

pub use init::{ensure_schema_with_retry, read_leader_epoch};
