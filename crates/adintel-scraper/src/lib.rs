//! Collection side of the pipeline: drives a page provider through a
//! bounded scroll loop and turns the raw items it exposes into
//! [`adintel_core::CreativeRecord`] values.

pub mod collector;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod provider;
pub mod rate_limit;
pub mod replay;
pub mod types;
pub mod url;

pub use collector::{
    CollectedCreative, Collector, CollectorSettings, TargetReport, TerminalState,
    MAX_CONSECUTIVE_STALLS,
};
pub use error::{ProviderError, ScraperError};
pub use normalize::{normalize_creative, NormalizeContext};
pub use provider::PageProvider;
pub use rate_limit::RetryingProvider;
pub use replay::{ReplayFixture, ReplayProvider, ReplayScript};
pub use types::{RawCreative, Target};
pub use url::{build_search_url, AD_LIBRARY_URL};
