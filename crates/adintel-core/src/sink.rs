//! Durable output for creatives and summaries.

use async_trait::async_trait;
use thiserror::Error;

use crate::creative::CreativeRecord;
use crate::summary::{EntitySummary, PeriodSummary};

/// Key under which the global period summary is stored.
pub const PERIOD_SUMMARY_KEY: &str = "weekly_summary";

/// Prefix for per-entity summary keys: `advertiser_<entity_id>`.
pub const ENTITY_KEY_PREFIX: &str = "advertiser_";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Storage collaborator. Records arrive one at a time in emission order;
/// summaries arrive once per run after collection completes.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn put_record(&self, record: &CreativeRecord) -> Result<(), SinkError>;

    async fn put_entity_summary(&self, summary: &EntitySummary) -> Result<(), SinkError>;

    async fn put_period_summary(&self, summary: &PeriodSummary) -> Result<(), SinkError>;
}

/// Storage key for one entity's summary.
#[must_use]
pub fn entity_summary_key(entity_id: &str) -> String {
    format!("{ENTITY_KEY_PREFIX}{entity_id}")
}
