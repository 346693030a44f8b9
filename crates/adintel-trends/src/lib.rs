//! Trend aggregation over classified creatives.
//!
//! Turns a run's records into one [`adintel_core::EntitySummary`] per
//! advertiser and a single [`adintel_core::PeriodSummary`]. Everything here
//! is a pure function of the records and a reference date.

pub mod aggregate;
pub mod context;
pub mod ranking;

pub use aggregate::{
    entity_summary, period_summary, PERIOD_WINDOW_DAYS, TOP_CATEGORY_LIMIT, TOP_CTA_LIMIT,
    TRAILING_MONTH_DAYS,
};
pub use context::RunContext;
pub use ranking::{top_k, Tally};
