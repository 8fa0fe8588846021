use std::time::Duration;

use dspu_core::config::SCHEMA_LOCK_KEY;
use dspu_core::error::{DspuError, Result};
use sqlx::{PgPool, Row};

/// Ensures the shared metadata table exists and the `leader_epoch` row is
/// seeded, retrying on transient failure up to `deadline`.
///
/// Safe to call concurrently from every peer at first boot: each attempt
/// takes the transaction-scoped `SCHEMA_LOCK` before touching the catalog,
/// so whichever peer gets there first creates the table and seeds the row
/// while the rest block, then see it already done.
pub async fn ensure_schema_with_retry(
    pool: &PgPool,
    deadline: Duration,
    retry_interval: Duration,
) -> Result<()> {
    let started = tokio::time::Instant::now();
    let mut last_error = String::from("schema init never attempted");

    loop {
        match try_ensure_schema_once(pool).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                last_error = e.to_string();
                tracing::warn!(error = %last_error, "schema init attempt failed, retrying");
            }
        }

        if started.elapsed() >= deadline {
            return Err(DspuError::SchemaInitTimeout {
                elapsed_s: started.elapsed().as_secs_f64(),
                last_error,
            });
        }

        tokio::time::sleep(retry_interval).await;
    }
}

async fn try_ensure_schema_once(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await.map_err(DspuError::Database)?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await
        .map_err(DspuError::Database)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS dspu_meta (k TEXT PRIMARY KEY, v TEXT NOT NULL)",
    )
    .execute(&mut *tx)
    .await
    .map_err(DspuError::Database)?;

    let existing = sqlx::query("SELECT v FROM dspu_meta WHERE k = 'leader_epoch'")
        .fetch_optional(&mut *tx)
        .await
        .map_err(DspuError::Database)?;

    if existing.is_none() {
        sqlx::query("INSERT INTO dspu_meta (k, v) VALUES ('leader_epoch', '0')")
            .execute(&mut *tx)
            .await
            .map_err(DspuError::Database)?;
    }

    tx.commit().await.map_err(DspuError::Database)?;
    Ok(())
}

/// Read `leader_epoch` from the metadata table, treating a missing row as `0`.
pub async fn read_leader_epoch(pool: &PgPool) -> Result<i64> {
    let row = sqlx::query("SELECT v FROM dspu_meta WHERE k = 'leader_epoch'")
        .fetch_optional(pool)
        .await
        .map_err(DspuError::Database)?;

    match row {
        Some(row) => {
            let raw: String = row.try_get("v").map_err(DspuError::Database)?;
            raw.parse().map_err(|_| {
                DspuError::Internal(format!("leader_epoch value not an integer: {raw}"))
            })
        }
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lock_key_is_the_documented_constant() {
        assert_eq!(SCHEMA_LOCK_KEY, 7_878_787_878);
    }
}
