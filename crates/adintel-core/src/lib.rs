pub mod app_config;
pub mod config;
pub mod creative;
pub mod run_config;
pub mod sink;
pub mod summary;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use creative::{AdAngle, CreativeRecord, HookStyle, MediaKind, OfferType};
pub use run_config::{load_run_config, parse_run_config, RunConfig, StatusFilter};
pub use sink::{entity_summary_key, RecordSink, SinkError, ENTITY_KEY_PREFIX, PERIOD_SUMMARY_KEY};
pub use summary::{EntitySummary, PeriodSummary, Ranking};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read run config {path}: {source}")]
    RunFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse run config: {0}")]
    RunFileParse(#[from] serde_yaml::Error),

    #[error("run config validation failed: {0}")]
    Validation(String),
}
