use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A ranked `(label, count)` list, highest count first.
pub type Ranking = Vec<(String, usize)>;

/// Aggregate over every creative owned by one advertiser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub entity_id: String,
    pub entity_name: String,
    pub total: usize,
    pub active: usize,
    pub media_breakdown: BTreeMap<String, usize>,
    /// Counts only records that carry an angle label.
    pub angle_breakdown: BTreeMap<String, usize>,
    pub hook_breakdown: BTreeMap<String, usize>,
    pub offer_breakdown: BTreeMap<String, usize>,
    pub cta_breakdown: BTreeMap<String, usize>,
    /// Mean over records with a known `days_active`; `None` when there are none.
    pub avg_days_active: Option<f64>,
    pub new_last_7_days: usize,
    pub new_last_30_days: usize,
}

/// Global snapshot produced once per aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub report_date: NaiveDate,
    /// ISO 8601 week number of `report_date`.
    pub report_week: u32,
    pub entity_count: usize,
    pub total_records: usize,
    pub new_this_period: usize,
    pub stopped_this_period: usize,
    pub top_angles: Ranking,
    pub top_hooks: Ranking,
    pub top_offers: Ranking,
    pub top_ctas: Ranking,
    pub media_distribution: BTreeMap<String, usize>,
    pub entity_summaries: Vec<EntitySummary>,
}
