use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod report;
mod run;
mod sink;
mod watch;

#[derive(Debug, Parser)]
#[command(name = "adintel")]
#[command(about = "Ad library collection and messaging analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect, classify and summarize every configured target once
    Run(RunArgs),
    /// Classify a piece of ad copy and print its labels
    Classify {
        /// Ad copy to classify
        text: String,
    },
    /// Re-aggregate a stored JSON Lines dataset and print the period summary
    Report {
        /// Path to a `creatives.jsonl` written by `run`
        #[arg(long)]
        input: PathBuf,
        /// Reference date for the trailing windows (defaults to today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Database management commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run collection on a cron schedule until interrupted
    Watch {
        /// Six-field cron expression (sec min hour day month weekday), UTC
        #[arg(long, default_value = watch::DEFAULT_CRON)]
        cron: String,
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Show recent collection runs and their per-target outcomes
    Runs {
        /// Maximum number of runs to show
        #[arg(long, default_value = "10")]
        limit: i64,
    },
}

/// Options shared by `run` and `watch`.
#[derive(Debug, Clone, Args)]
pub(crate) struct RunArgs {
    /// Run configuration file (defaults to `ADINTEL_RUN_CONFIG_PATH`)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Recorded ad library listings to collect from
    #[arg(long)]
    pub replay: Option<PathBuf>,
    /// Output directory (defaults to `ADINTEL_OUTPUT_DIR`)
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Also store creatives, summaries and run bookkeeping in Postgres
    #[arg(long)]
    pub db: bool,
    /// Print the targets and their URLs without collecting
    #[arg(long)]
    pub dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = adintel_core::load_app_config().context("failed to load application config")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run(args)) => run::run_command(&config, &args, "cli").await,
        Some(Commands::Classify { text }) => {
            print_classification(&text);
            Ok(())
        }
        Some(Commands::Report { input, date }) => report::run_report(&input, date).await,
        Some(Commands::Db { command }) => run_db_command(&config, command).await,
        Some(Commands::Watch { cron, run }) => watch::run_watch(config, &cron, run).await,
        None => {
            println!("adintel: no command given; see `adintel --help`");
            Ok(())
        }
    }
}

fn print_classification(text: &str) {
    let labels = adintel_classifier::classify_text(text);
    println!("angle: {}", labels.angle);
    println!("hook:  {}", labels.hook);
    println!("offer: {}", labels.offer);
}

async fn run_db_command(
    config: &adintel_core::AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    let pool = adintel_db::connect_from_app_config(config)
        .await
        .context("failed to connect to database")?;

    match command {
        DbCommands::Ping => {
            adintel_db::ping(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = adintel_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Runs { limit } => run::print_recent_runs(&pool, limit).await?,
    }

    Ok(())
}
