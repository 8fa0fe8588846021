use std::time::Duration;

use dspu_core::error::{DspuError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Default pool size. The controller's write volume is one upsert every
/// `LEADER_POLL_S` from whichever peer is leader, plus occasional health
/// checks — a small pool is deliberate, not a placeholder.
const DEFAULT_POOL_SIZE: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pooled access to the backing store, used by the HTTP gateway for
/// read-only queries (`/role`) and by schema initialisation.
///
/// The election loop does NOT use this pool: it needs a single physical
/// connection held for the lifetime of the lock, which a pool cannot
/// guarantee across two separate acquisitions. See `dspu_runtime::election`.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_POOL_SIZE)
            .acquire_timeout(DEFAULT_ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(DspuError::Database)?;

        Ok(Self { pool })
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check connectivity with a trivial round trip.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DspuError::Database)?;
        Ok(())
    }

    /// Close all pooled connections gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_size_is_small() {
        assert!(DEFAULT_POOL_SIZE <= 10);
    }
}
