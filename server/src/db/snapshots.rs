//! Database operations for the snapshots table.
//!
//! This is the storage primitive behind every hosted workspace: one opaque
//! blob per key, read once when the workspace is first touched and written
//! after each command.

use sqlx::{PgPool, Row};

/// Read the blob stored under `key`.
pub async fn get_snapshot(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
    let row = sqlx::query("SELECT blob FROM snapshots WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    row.map(|r| r.try_get("blob")).transpose()
}

/// Store `blob` under `key`, replacing whatever was there.
pub async fn put_snapshot(pool: &PgPool, key: &str, blob: &str) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now().timestamp_millis();

    sqlx::query(
        r#"
        INSERT INTO snapshots (key, blob, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (key) DO UPDATE SET
            blob = EXCLUDED.blob,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(key)
    .bind(blob)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove the blob stored under `key`. Removing a missing key is fine.
pub async fn delete_snapshot(pool: &PgPool, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM snapshots WHERE key = $1")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}
