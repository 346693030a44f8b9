//! Database operations for the `summaries` key/value table.

use sqlx::PgPool;

use crate::DbError;

/// Stores `body` under `key`, replacing any earlier value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_summary(
    pool: &PgPool,
    key: &str,
    body: &serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO summaries (key, body) VALUES ($1, $2) \
         ON CONFLICT (key) DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()",
    )
    .bind(key)
    .bind(body)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the stored value for `key`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_summary(pool: &PgPool, key: &str) -> Result<Option<serde_json::Value>, DbError> {
    let body = sqlx::query_scalar::<_, serde_json::Value>("SELECT body FROM summaries WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(body)
}
