use std::time::Duration;

/// Election tuning, derived from [`dspu_core::config::Config`] at startup.
#[derive(Debug, Clone)]
pub struct ElectionConfig {
    /// This process's identity, written as `leader_id` on acquisition.
    pub node_id: String,
    /// Advisory lock key for `LEADER_LOCK`. Must match across all peers.
    pub lock_key: i64,
    /// Interval between election ticks.
    pub poll_interval: Duration,
    /// Bound on how long `stop()` waits for the loop to exit.
    pub join_timeout: Duration,
}

impl ElectionConfig {
    pub fn new(node_id: impl Into<String>, lock_key: i64, poll_interval: Duration) -> Self {
        Self {
            node_id: node_id.into(),
            lock_key,
            poll_interval,
            join_timeout: Duration::from_secs(5),
        }
    }
}
