//! `run` command: wires config, provider and sinks around the pipeline.
//!
//! With `--db` the run is also tracked in `collection_runs`: created
//! queued, started, and then completed or failed, with one
//! `collection_run_targets` row per target.

mod pipeline;

use std::path::Path;

use adintel_core::{load_run_config, AppConfig, RecordSink, RunConfig};
use adintel_db::{PgSink, TargetResult};
use adintel_scraper::{build_search_url, Collector, ReplayProvider, RetryingProvider};
use anyhow::Context;
use chrono::Utc;
use sqlx::PgPool;

use crate::sink::{FanOutSink, JsonDirSink};
use crate::RunArgs;

use pipeline::{run_pipeline, PipelineOutcome};

/// Executes one collection run as described by `args`.
///
/// `trigger_source` is recorded on the collection run (`cli` or
/// `scheduled`).
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the replay file or
/// output directory is unusable, storage fails, or every target failed.
pub(crate) async fn run_command(
    config: &AppConfig,
    args: &RunArgs,
    trigger_source: &str,
) -> anyhow::Result<()> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config.run_config_path.clone());
    let run_config = load_run_config(&config_path)
        .with_context(|| format!("failed to load run config from {}", config_path.display()))?;

    if args.dry_run {
        print_plan(&run_config);
        return Ok(());
    }

    let replay_path = args
        .replay
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--replay is required unless --dry-run is set"))?;
    let provider = build_provider(config, replay_path)?;

    let out_dir = args.out.clone().unwrap_or_else(|| config.output_dir.clone());
    let json_sink = JsonDirSink::create(&out_dir)
        .await
        .with_context(|| format!("failed to prepare output directory {}", out_dir.display()))?;
    tracing::info!(out_dir = %json_sink.dir().display(), "writing output");

    let today = Utc::now().date_naive();

    if !args.db {
        let outcome = run_pipeline(&run_config, provider, &json_sink, today).await?;
        return finish(&outcome);
    }

    let pool = adintel_db::connect_from_app_config(config)
        .await
        .context("failed to connect to database")?;
    let sink = FanOutSink::new(vec![
        Box::new(json_sink),
        Box::new(PgSink::new(pool.clone())),
    ]);
    run_tracked(&pool, &run_config, provider, &sink, trigger_source, today).await
}

fn build_provider(
    config: &AppConfig,
    replay_path: &Path,
) -> anyhow::Result<RetryingProvider<ReplayProvider>> {
    let replay = ReplayProvider::from_path(replay_path)
        .with_context(|| format!("failed to load replay file {}", replay_path.display()))?;
    tracing::debug!(
        recorded_targets = replay.fixture().targets.len(),
        "loaded replay fixture"
    );
    Ok(RetryingProvider::new(
        replay,
        config.provider_max_retries,
        config.provider_retry_backoff_ms,
    ))
}

/// Runs the pipeline inside a tracked collection run.
async fn run_tracked(
    pool: &PgPool,
    run_config: &RunConfig,
    provider: RetryingProvider<ReplayProvider>,
    sink: &dyn RecordSink,
    trigger_source: &str,
    today: chrono::NaiveDate,
) -> anyhow::Result<()> {
    let run = adintel_db::create_collection_run(pool, trigger_source).await?;
    adintel_db::start_collection_run(pool, run.id).await?;
    tracing::info!(run_id = run.id, public_id = %run.public_id, "collection run started");

    let outcome = match run_pipeline(run_config, provider, sink, today).await {
        Ok(outcome) => outcome,
        Err(err) => {
            fail_run_best_effort(pool, run.id, 0, format!("{err:#}")).await;
            return Err(err);
        }
    };

    record_targets(pool, run.id, &outcome).await;

    if outcome.all_failed() {
        let message = all_failed_message(&outcome);
        fail_run_best_effort(pool, run.id, outcome.records_written, message.clone()).await;
        anyhow::bail!(message);
    }

    if let Err(err) =
        adintel_db::complete_collection_run(pool, run.id, outcome.records_written).await
    {
        fail_run_best_effort(pool, run.id, outcome.records_written, format!("{err:#}")).await;
        return Err(err.into());
    }

    print_outcome(&outcome);
    Ok(())
}

/// Writes one `collection_run_targets` row per report. Failures are logged,
/// not propagated: the records themselves are already stored.
async fn record_targets(pool: &PgPool, run_id: i64, outcome: &PipelineOutcome) {
    for report in &outcome.reports {
        let target = report.target.to_string();
        let result = TargetResult {
            target: &target,
            state: report.state.as_str(),
            emitted: report.emitted,
            dropped: report.dropped,
            error_message: report.error.as_deref(),
        };
        if let Err(e) = adintel_db::upsert_collection_run_target(pool, run_id, &result).await {
            tracing::warn!(run_id, target = %target, error = %e, "failed to record target outcome");
        }
    }
}

/// Marks a run as failed, logging (not propagating) any error from the
/// bookkeeping update itself.
async fn fail_run_best_effort(
    pool: &PgPool,
    run_id: i64,
    records_processed: usize,
    message: String,
) {
    if let Err(mark_err) =
        adintel_db::fail_collection_run(pool, run_id, records_processed, &message).await
    {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark collection run as failed"
        );
    }
}

fn finish(outcome: &PipelineOutcome) -> anyhow::Result<()> {
    if outcome.all_failed() {
        anyhow::bail!(all_failed_message(outcome));
    }
    print_outcome(outcome);
    Ok(())
}

fn all_failed_message(outcome: &PipelineOutcome) -> String {
    format!(
        "all {} target(s) failed; {} creative(s) stored",
        outcome.reports.len(),
        outcome.records_written
    )
}

fn print_plan(config: &RunConfig) {
    let targets = Collector::<ReplayProvider>::targets(config);
    println!("dry-run: would collect {} target(s)", targets.len());
    for target in &targets {
        println!("  {target}\t{}", build_search_url(config, target));
    }
}

fn print_outcome(outcome: &PipelineOutcome) {
    let header = format!(
        "{:<32}{:<11}{:>8}{:>9}  ERROR",
        "TARGET", "STATE", "EMITTED", "DROPPED"
    );
    println!("{header}");
    for report in &outcome.reports {
        println!(
            "{:<32}{:<11}{:>8}{:>9}  {}",
            report.target.to_string(),
            report.state.as_str(),
            report.emitted,
            report.dropped,
            report.error.as_deref().unwrap_or("-")
        );
    }
    println!(
        "stored {} creative(s) across {} entity summary(ies); {} duplicate(s), {} rejected",
        outcome.records_written,
        outcome.entity_summaries,
        outcome.duplicates,
        outcome.rejected
    );
    if let Some(period) = &outcome.period {
        println!(
            "week {} ({}): {} new, {} stopped in the last 7 days",
            period.report_week, period.report_date, period.new_this_period, period.stopped_this_period
        );
    }
}

/// Prints the most recent collection runs with their per-target rows.
///
/// # Errors
///
/// Returns an error if a query fails.
pub(crate) async fn print_recent_runs(pool: &PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = adintel_db::list_collection_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no collection runs recorded; run `adintel run --db` first");
        return Ok(());
    }

    for run in &runs {
        let started = run
            .started_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!(
            "run {} [{}] {} via {} started {} records {}",
            run.id, run.public_id, run.status, run.trigger_source, started, run.records_processed
        );
        if let Some(message) = &run.error_message {
            println!("  error: {message}");
        }
        for target in adintel_db::list_collection_run_targets(pool, run.id).await? {
            println!(
                "  {:<30}{:<11}emitted {:>5}  dropped {:>5}",
                target.target, target.state, target.emitted, target.dropped
            );
        }
    }

    Ok(())
}
