use thiserror::Error;

/// Failure reported by a page provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("provider timed out during {operation}")]
    Timeout { operation: &'static str },

    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("provider error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("target session exceeded {timeout_secs}s")]
    TargetTimeout { timeout_secs: u64 },

    #[error("collection output channel closed")]
    OutputClosed,

    #[error("normalization error for ad {ad_id:?}: {reason}")]
    Normalization { ad_id: Option<String>, reason: String },

    #[error("failed to read replay fixture {path}: {source}")]
    FixtureIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse replay fixture: {0}")]
    FixtureParse(#[from] serde_json::Error),
}
