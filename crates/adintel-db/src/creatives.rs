//! Database operations for the `creatives` table.

use adintel_core::CreativeRecord;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `creatives` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreativeRow {
    pub ad_id: String,
    pub entity_id: String,
    pub entity_name: String,
    pub body_text: Option<String>,
    pub cta_text: Option<String>,
    pub landing_page_url: Option<String>,
    pub media_kind: String,
    pub media_urls: Vec<String>,
    pub is_active: bool,
    pub started_on: Option<NaiveDate>,
    pub ended_on: Option<NaiveDate>,
    pub impressions_lower: Option<i64>,
    pub impressions_upper: Option<i64>,
    pub angle: Option<String>,
    pub hook: Option<String>,
    pub offer: Option<String>,
    pub days_active: Option<i64>,
    pub collected_at: DateTime<Utc>,
    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inserts a creative or refreshes the stored copy.
///
/// Conflicts on `ad_id` overwrite every observed field and bump
/// `updated_at`; `first_seen_at` keeps the original insert time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_creative(pool: &PgPool, record: &CreativeRecord) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO creatives ( \
             ad_id, entity_id, entity_name, body_text, headline, description, \
             cta_text, cta_link, landing_page_url, media_kind, media_urls, is_active, \
             started_on, ended_on, platforms, impressions_lower, impressions_upper, \
             spend_lower, spend_upper, country_code, collected_at, angle, hook, offer, \
             days_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 $16, $17, $18, $19, $20, $21, $22, $23, $24, $25) \
         ON CONFLICT (ad_id) DO UPDATE SET \
             entity_id         = EXCLUDED.entity_id, \
             entity_name       = EXCLUDED.entity_name, \
             body_text         = EXCLUDED.body_text, \
             headline          = EXCLUDED.headline, \
             description       = EXCLUDED.description, \
             cta_text          = EXCLUDED.cta_text, \
             cta_link          = EXCLUDED.cta_link, \
             landing_page_url  = EXCLUDED.landing_page_url, \
             media_kind        = EXCLUDED.media_kind, \
             media_urls        = EXCLUDED.media_urls, \
             is_active         = EXCLUDED.is_active, \
             started_on        = EXCLUDED.started_on, \
             ended_on          = EXCLUDED.ended_on, \
             platforms         = EXCLUDED.platforms, \
             impressions_lower = EXCLUDED.impressions_lower, \
             impressions_upper = EXCLUDED.impressions_upper, \
             spend_lower       = EXCLUDED.spend_lower, \
             spend_upper       = EXCLUDED.spend_upper, \
             country_code      = EXCLUDED.country_code, \
             collected_at      = EXCLUDED.collected_at, \
             angle             = EXCLUDED.angle, \
             hook              = EXCLUDED.hook, \
             offer             = EXCLUDED.offer, \
             days_active       = EXCLUDED.days_active, \
             updated_at        = NOW()",
    )
    .bind(&record.ad_id)
    .bind(&record.entity_id)
    .bind(&record.entity_name)
    .bind(record.body_text.as_deref())
    .bind(record.headline.as_deref())
    .bind(record.description.as_deref())
    .bind(record.cta_text.as_deref())
    .bind(record.cta_link.as_deref())
    .bind(record.landing_page_url.as_deref())
    .bind(record.media_kind.as_str())
    .bind(&record.media_urls)
    .bind(record.is_active)
    .bind(record.started_on)
    .bind(record.ended_on)
    .bind(&record.platforms)
    .bind(record.impressions_lower.and_then(|v| i64::try_from(v).ok()))
    .bind(record.impressions_upper.and_then(|v| i64::try_from(v).ok()))
    .bind(record.spend_lower)
    .bind(record.spend_upper)
    .bind(&record.country_code)
    .bind(record.collected_at)
    .bind(record.angle.map(|a| a.as_str()))
    .bind(record.hook.map(|h| h.as_str()))
    .bind(record.offer.map(|o| o.as_str()))
    .bind(record.days_active)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches one creative by ad library id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_creative(pool: &PgPool, ad_id: &str) -> Result<CreativeRow, DbError> {
    sqlx::query_as::<_, CreativeRow>(
        "SELECT ad_id, entity_id, entity_name, body_text, cta_text, landing_page_url, \
                media_kind, media_urls, is_active, started_on, ended_on, \
                impressions_lower, impressions_upper, angle, hook, offer, days_active, \
                collected_at, first_seen_at, updated_at \
         FROM creatives \
         WHERE ad_id = $1",
    )
    .bind(ad_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Number of stored creatives.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_creatives(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM creatives")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
