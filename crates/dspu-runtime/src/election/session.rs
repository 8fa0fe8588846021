use dspu_core::error::{DspuError, Result};
use sqlx::{Connection, PgConnection, Row};

/// The single physical connection a peer uses to contend for `LEADER_LOCK`.
///
/// `pg_advisory_lock`/`pg_advisory_unlock` are session-scoped: the backing
/// store ties lock ownership to the physical connection that acquired it,
/// not to any particular transaction. A pooled connection can be handed
/// back and reused for an unrelated query between acquiring the lock and
/// later releasing it, which would silently break mutual exclusion — so
/// this type owns a dedicated [`PgConnection`] for as long as this peer
/// might be LEADER, never a [`sqlx::PgPool`].
///
/// Outside of `bump_epoch`, every statement below runs standalone (no
/// explicit transaction), so the connection auto-commits per statement:
/// an aborted transaction elsewhere on this connection can never silently
/// release the lock.
pub struct ElectionSession {
    conn: PgConnection,
}

impl ElectionSession {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let conn = PgConnection::connect(database_url)
            .await
            .map_err(DspuError::Database)?;
        Ok(Self { conn })
    }

    /// Non-blocking attempt to acquire `LEADER_LOCK`. Returns `true` iff
    /// this session now holds it.
    pub async fn try_acquire_lock(&mut self, lock_key: i64) -> Result<bool> {
        let row = sqlx::query("SELECT pg_try_advisory_lock($1) AS acquired")
            .bind(lock_key)
            .fetch_one(&mut self.conn)
            .await
            .map_err(DspuError::Database)?;
        row.try_get("acquired").map_err(DspuError::Database)
    }

    /// Release `LEADER_LOCK` if held by this session. Idempotent: releasing
    /// a lock this session does not hold is a harmless no-op at the SQL
    /// level (`pg_advisory_unlock` returns false).
    pub async fn release_lock(&mut self, lock_key: i64) -> Result<()> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(lock_key)
            .execute(&mut self.conn)
            .await
            .map_err(DspuError::Database)?;
        Ok(())
    }

    /// The bump transaction: read `leader_epoch`, write
    /// `leader_epoch = old + 1`, `leader_id = node_id`, `updated_ms = now`,
    /// all co-committed. Returns the new epoch.
    ///
    /// Must only be called immediately after winning `LEADER_LOCK`; the
    /// caller is responsible for dropping back to STANDBY (never
    /// publishing LEADER) if this fails.
    pub async fn bump_epoch(&mut self, node_id: &str) -> Result<i64> {
        let mut tx = self.conn.begin().await.map_err(DspuError::Database)?;

        let current = sqlx::query("SELECT v FROM dspu_meta WHERE k = 'leader_epoch'")
            .fetch_optional(&mut *tx)
            .await
            .map_err(DspuError::Database)?;

        let old_epoch: i64 = match current {
            Some(row) => {
                let raw: String = row.try_get("v").map_err(DspuError::Database)?;
                raw.parse().unwrap_or(0)
            }
            None => 0,
        };
        let new_epoch = old_epoch + 1;

        sqlx::query(
            "INSERT INTO dspu_meta (k, v) VALUES \
                ('leader_epoch', $1), \
                ('leader_id', $2), \
                ('updated_ms', (extract(epoch from clock_timestamp()) * 1000)::bigint::text) \
             ON CONFLICT (k) DO UPDATE SET v = EXCLUDED.v",
        )
        .bind(new_epoch.to_string())
        .bind(node_id)
        .execute(&mut *tx)
        .await
        .map_err(DspuError::Database)?;

        tx.commit().await.map_err(DspuError::Database)?;
        Ok(new_epoch)
    }

    /// Best-effort read of the durable epoch/leader_id pair, used while in
    /// STANDBY. Callers treat a read failure as transient and fall back to
    /// epoch absent / leader_id absent for this tick only.
    pub async fn read_epoch_and_leader(&mut self) -> Result<(Option<i64>, Option<String>)> {
        let rows = sqlx::query("SELECT k, v FROM dspu_meta WHERE k IN ('leader_epoch', 'leader_id')")
            .fetch_all(&mut self.conn)
            .await
            .map_err(DspuError::Database)?;

        let mut epoch = None;
        let mut leader_id = None;
        for row in rows {
            let k: String = row.try_get("k").map_err(DspuError::Database)?;
            let v: String = row.try_get("v").map_err(DspuError::Database)?;
            match k.as_str() {
                "leader_epoch" => epoch = v.parse::<i64>().ok(),
                "leader_id" => leader_id = Some(v),
                _ => {}
            }
        }
        Ok((epoch, leader_id))
    }

    /// Cleanly close the connection, which also releases any advisory lock
    /// still held (session termination is the backstop release primitive).
    pub async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(DspuError::Database)
    }
}
