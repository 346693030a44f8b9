//! `watch` command: recurring collection runs on a cron schedule.

use std::sync::Arc;

use adintel_core::AppConfig;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::run::run_command;
use crate::RunArgs;

/// Weekly, Sunday 02:00 UTC.
pub(crate) const DEFAULT_CRON: &str = "0 0 2 * * SUN";

/// Registers a collection job on `cron` and runs it until Ctrl-C.
///
/// A failed run is logged and the schedule carries on.
///
/// # Errors
///
/// Returns an error if the cron expression is invalid or the scheduler
/// cannot be started or shut down.
pub(crate) async fn run_watch(config: AppConfig, cron: &str, args: RunArgs) -> anyhow::Result<()> {
    let mut scheduler = JobScheduler::new().await?;

    let config = Arc::new(config);
    let args = Arc::new(args);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let config = Arc::clone(&config);
        let args = Arc::clone(&args);

        Box::pin(async move {
            tracing::info!("scheduler: starting collection run");
            match run_command(&config, &args, "scheduled").await {
                Ok(()) => tracing::info!("scheduler: collection run complete"),
                Err(e) => tracing::error!(error = %format!("{e:#}"), "scheduler: collection run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron = %cron, "scheduler: registered collection job");

    tokio::signal::ctrl_c().await?;
    tracing::info!("scheduler: shutting down");
    scheduler.shutdown().await?;
    Ok(())
}
