use std::time::Duration;

use crate::error::{DspuError, Result};

/// Controller configuration, loaded once at startup from the process
/// environment. Every field here corresponds to one of the environment
/// variables the controller recognises; there is no config file and no
/// CLI flag overrides the table below — `.env` (via `dotenvy`, loaded by
/// the binary before `Config::from_env` runs) is the only indirection.
#[derive(Debug, Clone)]
pub struct Config {
    /// `DATABASE_URL` — connection string to the backing store. Required.
    pub database_url: String,
    /// `NODE_ID` — this process's identity. Default `node-unknown`.
    pub node_id: String,
    /// `LEADER_LOCK_KEY` — advisory lock key for `LEADER_LOCK`. Must be
    /// identical across peers. Default `915707001`.
    pub leader_lock_key: i64,
    /// `LEADER_POLL_S` — election tick interval. Default `0.5`.
    pub leader_poll: Duration,
    /// `PG_SCHEMA_RETRY_S` — total deadline for schema init. Default `15`.
    pub schema_retry_deadline: Duration,
    /// `PG_SCHEMA_RETRY_INTERVAL_S` — interval between schema init
    /// attempts. Default `0.5`.
    pub schema_retry_interval: Duration,
    /// `LEADER_URL` — external URL advertised in NOT_LEADER responses.
    /// Absent unless set.
    pub leader_url: Option<String>,
    /// `PORT` — HTTP listening port. Default `8080`.
    pub port: u16,
}

/// Fixed advisory lock key for `SCHEMA_LOCK`, distinct from
/// `LEADER_LOCK_KEY` (which is configurable and must match across peers).
/// An arbitrary but stable int8, matching the style of the original
/// `SCHEMA_LOCK_ID` constant this was distilled from.
pub const SCHEMA_LOCK_KEY: i64 = 7_878_787_878;

const DEFAULT_NODE_ID: &str = "node-unknown";
const DEFAULT_LEADER_LOCK_KEY: i64 = 915_707_001;
const DEFAULT_LEADER_POLL_S: f64 = 0.5;
const DEFAULT_SCHEMA_RETRY_S: f64 = 15.0;
const DEFAULT_SCHEMA_RETRY_INTERVAL_S: f64 = 0.5;
const DEFAULT_PORT: u16 = 8080;

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Fails with [`DspuError::Config`] (the `CONFIG_MISSING` kind) when
    /// `DATABASE_URL` is absent or any numeric variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| DspuError::Config("DATABASE_URL is required".to_string()))?;

        let node_id = env_or("NODE_ID", DEFAULT_NODE_ID.to_string());
        let leader_lock_key = parse_env("LEADER_LOCK_KEY", DEFAULT_LEADER_LOCK_KEY)?;
        let leader_poll = Duration::from_secs_f64(parse_env("LEADER_POLL_S", DEFAULT_LEADER_POLL_S)?);
        let schema_retry_deadline =
            Duration::from_secs_f64(parse_env("PG_SCHEMA_RETRY_S", DEFAULT_SCHEMA_RETRY_S)?);
        let schema_retry_interval = Duration::from_secs_f64(parse_env(
            "PG_SCHEMA_RETRY_INTERVAL_S",
            DEFAULT_SCHEMA_RETRY_INTERVAL_S,
        )?);
        let leader_url = std::env::var("LEADER_URL").ok();
        let port = parse_env("PORT", DEFAULT_PORT)?;

        Ok(Self {
            database_url,
            node_id,
            leader_lock_key,
            leader_poll,
            schema_retry_deadline,
            schema_retry_interval,
            leader_url,
            port,
        })
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| DspuError::Config(format!("invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // std::env::set_var races across tests run in the same process; serialize them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all() {
        for var in [
            "DATABASE_URL",
            "NODE_ID",
            "LEADER_LOCK_KEY",
            "LEADER_POLL_S",
            "PG_SCHEMA_RETRY_S",
            "PG_SCHEMA_RETRY_INTERVAL_S",
            "LEADER_URL",
            "PORT",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn missing_database_url_is_config_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, DspuError::Config(_)));
    }

    #[test]
    fn applies_documented_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        std::env::set_var("DATABASE_URL", "postgres://localhost/dspu");
        let config = Config::from_env().unwrap();
        assert_eq!(config.node_id, "node-unknown");
        assert_eq!(config.leader_lock_key, 915_707_001);
        assert_eq!(config.leader_poll, Duration::from_millis(500));
        assert_eq!(config.schema_retry_deadline, Duration::from_secs(15));
        assert_eq!(config.schema_retry_interval, Duration::from_millis(500));
        assert_eq!(config.port, 8080);
        assert!(config.leader_url.is_none());
        clear_all();
    }

    #[test]
    fn reads_every_documented_variable() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        std::env::set_var("DATABASE_URL", "postgres://localhost/dspu");
        std::env::set_var("NODE_ID", "node-a");
        std::env::set_var("LEADER_LOCK_KEY", "42");
        std::env::set_var("LEADER_POLL_S", "0.2");
        std::env::set_var("PG_SCHEMA_RETRY_S", "5");
        std::env::set_var("PG_SCHEMA_RETRY_INTERVAL_S", "0.1");
        std::env::set_var("LEADER_URL", "http://127.0.0.1:18081");
        std::env::set_var("PORT", "18080");

        let config = Config::from_env().unwrap();
        assert_eq!(config.node_id, "node-a");
        assert_eq!(config.leader_lock_key, 42);
        assert_eq!(config.leader_poll, Duration::from_millis(200));
        assert_eq!(config.schema_retry_deadline, Duration::from_secs(5));
        assert_eq!(config.schema_retry_interval, Duration::from_millis(100));
        assert_eq!(
            config.leader_url.as_deref(),
            Some("http://127.0.0.1:18081")
        );
        assert_eq!(config.port, 18080);
        clear_all();
    }

    #[test]
    fn schema_lock_key_differs_from_default_leader_lock_key() {
        assert_ne!(SCHEMA_LOCK_KEY, DEFAULT_LEADER_LOCK_KEY);
    }
}
