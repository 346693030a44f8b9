//! File-backed [`RecordSink`] and fan-out over several sinks.

use std::path::{Path, PathBuf};

use adintel_core::{
    entity_summary_key, CreativeRecord, EntitySummary, PeriodSummary, RecordSink, SinkError,
    PERIOD_SUMMARY_KEY,
};
use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File holding one JSON object per creative.
pub(crate) const RECORDS_FILE: &str = "creatives.jsonl";

/// Writes creatives as JSON Lines to `<dir>/creatives.jsonl` and every
/// summary as a pretty-printed `<dir>/<key>.json`.
///
/// The records file is truncated when the sink is created, so a directory
/// always holds the output of a single run.
#[derive(Debug)]
pub(crate) struct JsonDirSink {
    dir: PathBuf,
    records: Mutex<File>,
}

impl JsonDirSink {
    /// Creates `dir` if needed and opens a fresh records file inside it.
    pub(crate) async fn create(dir: &Path) -> Result<Self, SinkError> {
        tokio::fs::create_dir_all(dir).await?;
        let records = File::create(dir.join(RECORDS_FILE)).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_summary<T: serde::Serialize + ?Sized>(
        &self,
        key: &str,
        summary: &T,
    ) -> Result<(), SinkError> {
        let body = serde_json::to_vec_pretty(summary)?;
        tokio::fs::write(self.dir.join(format!("{key}.json")), body).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for JsonDirSink {
    async fn put_record(&self, record: &CreativeRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = self.records.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    async fn put_entity_summary(&self, summary: &EntitySummary) -> Result<(), SinkError> {
        self.write_summary(&entity_summary_key(&summary.entity_id), summary)
            .await
    }

    async fn put_period_summary(&self, summary: &PeriodSummary) -> Result<(), SinkError> {
        self.write_summary(PERIOD_SUMMARY_KEY, summary).await
    }
}

/// Forwards every write to each inner sink in order; the first error wins.
pub(crate) struct FanOutSink {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl FanOutSink {
    pub(crate) fn new(sinks: Vec<Box<dyn RecordSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl RecordSink for FanOutSink {
    async fn put_record(&self, record: &CreativeRecord) -> Result<(), SinkError> {
        for sink in &self.sinks {
            sink.put_record(record).await?;
        }
        Ok(())
    }

    async fn put_entity_summary(&self, summary: &EntitySummary) -> Result<(), SinkError> {
        for sink in &self.sinks {
            sink.put_entity_summary(summary).await?;
        }
        Ok(())
    }

    async fn put_period_summary(&self, summary: &PeriodSummary) -> Result<(), SinkError> {
        for sink in &self.sinks {
            sink.put_period_summary(summary).await?;
        }
        Ok(())
    }
}
