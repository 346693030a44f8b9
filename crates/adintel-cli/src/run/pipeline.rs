//! One collection run: collect, normalize, classify, store, summarize.
//!
//! The collector feeds a bounded channel; a consumer running alongside it
//! normalizes and stores each creative as it arrives. Summaries are built
//! from the accumulated [`RunContext`] once every target has finished.

use std::collections::HashSet;

use adintel_classifier::classify_record;
use adintel_core::{PeriodSummary, RecordSink, RunConfig, SinkError};
use adintel_scraper::{
    normalize_creative, CollectedCreative, Collector, CollectorSettings, NormalizeContext,
    PageProvider, TargetReport, TerminalState,
};
use adintel_trends::RunContext;
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tokio::sync::mpsc;

/// Items buffered between the collector and the consumer.
const CHANNEL_CAPACITY: usize = 64;

/// What a finished pipeline produced.
#[derive(Debug)]
pub(crate) struct PipelineOutcome {
    /// One report per target, in target order.
    pub reports: Vec<TargetReport>,
    /// Creatives handed to the sink.
    pub records_written: usize,
    /// Creatives already stored earlier in the run under another target.
    pub duplicates: usize,
    /// Items the normalizer refused.
    pub rejected: usize,
    pub entity_summaries: usize,
    pub period: Option<PeriodSummary>,
}

impl PipelineOutcome {
    pub(crate) fn failed_targets(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.state == TerminalState::Failed)
            .count()
    }

    /// `true` when there was at least one target and none of them succeeded.
    pub(crate) fn all_failed(&self) -> bool {
        !self.reports.is_empty() && self.failed_targets() == self.reports.len()
    }
}

/// Consumer-side counters.
#[derive(Debug, Default)]
struct Intake {
    context: RunContext,
    seen: HashSet<String>,
    duplicates: usize,
    rejected: usize,
}

/// Runs every target in `config` through `provider` and stores the results
/// in `sink`. `today` is both the classifier's clock and the summaries'
/// reference date.
///
/// Target failures are reported in the outcome, not returned as errors.
///
/// # Errors
///
/// Returns an error if the sink rejects a creative or a summary.
pub(crate) async fn run_pipeline<P: PageProvider>(
    config: &RunConfig,
    provider: P,
    sink: &dyn RecordSink,
    today: NaiveDate,
) -> anyhow::Result<PipelineOutcome> {
    let collector = Collector::new(provider, CollectorSettings::from_run_config(config));
    let (tx, rx) = mpsc::channel::<CollectedCreative>(CHANNEL_CAPACITY);

    let (reports, intake) = tokio::join!(
        collector.collect_all(config, tx),
        consume(config, rx, sink, today)
    );
    let intake = intake.context("failed to store creative")?;

    let (entity_summaries, period) = intake.context.summarize(today);
    for summary in &entity_summaries {
        sink.put_entity_summary(summary).await.with_context(|| {
            format!("failed to store summary for entity {:?}", summary.entity_id)
        })?;
    }
    if let Some(period) = &period {
        sink.put_period_summary(period)
            .await
            .context("failed to store period summary")?;
    }

    let outcome = PipelineOutcome {
        reports,
        records_written: intake.context.len(),
        duplicates: intake.duplicates,
        rejected: intake.rejected,
        entity_summaries: entity_summaries.len(),
        period,
    };
    tracing::info!(
        records = outcome.records_written,
        duplicates = outcome.duplicates,
        rejected = outcome.rejected,
        entities = outcome.entity_summaries,
        failed_targets = outcome.failed_targets(),
        "pipeline finished"
    );
    Ok(outcome)
}

/// Drains `rx` until every sender is gone. Returning early drops the
/// receiver, which fails the targets still sending.
async fn consume(
    config: &RunConfig,
    mut rx: mpsc::Receiver<CollectedCreative>,
    sink: &dyn RecordSink,
    today: NaiveDate,
) -> Result<Intake, SinkError> {
    let collected_at = Utc::now();
    let mut intake = Intake::default();

    while let Some(item) = rx.recv().await {
        let ctx = NormalizeContext {
            entity_id: &item.entity_id,
            entity_name: &item.entity_name,
            country_code: &config.country_code,
            include_media: config.include_media_urls,
            collected_at,
        };
        let mut record = match normalize_creative(item.raw, &ctx) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(entity_id = %item.entity_id, error = %e, "skipping creative");
                intake.rejected += 1;
                continue;
            }
        };

        if !intake.seen.insert(record.ad_id.clone()) {
            tracing::debug!(ad_id = %record.ad_id, "creative already stored this run");
            intake.duplicates += 1;
            continue;
        }

        if config.classify_ads {
            classify_record(&mut record, today);
        }

        sink.put_record(&record).await?;
        intake.context.push(record);
    }

    Ok(intake)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
