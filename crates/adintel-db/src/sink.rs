//! [`RecordSink`] backed by Postgres.

use adintel_core::{
    entity_summary_key, CreativeRecord, EntitySummary, PeriodSummary, RecordSink, SinkError,
    PERIOD_SUMMARY_KEY,
};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::creatives::upsert_creative;
use crate::summaries::upsert_summary;
use crate::DbError;

/// Upserts creatives by `ad_id` and summaries by key.
#[derive(Debug, Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: DbError) -> SinkError {
    SinkError::Backend(Box::new(err))
}

#[async_trait]
impl RecordSink for PgSink {
    async fn put_record(&self, record: &CreativeRecord) -> Result<(), SinkError> {
        upsert_creative(&self.pool, record).await.map_err(backend)
    }

    async fn put_entity_summary(&self, summary: &EntitySummary) -> Result<(), SinkError> {
        let body = serde_json::to_value(summary)?;
        upsert_summary(&self.pool, &entity_summary_key(&summary.entity_id), &body)
            .await
            .map_err(backend)
    }

    async fn put_period_summary(&self, summary: &PeriodSummary) -> Result<(), SinkError> {
        let body = serde_json::to_value(summary)?;
        tracing::debug!(key = PERIOD_SUMMARY_KEY, "storing period summary");
        upsert_summary(&self.pool, PERIOD_SUMMARY_KEY, &body)
            .await
            .map_err(backend)
    }
}
