//! Per-advertiser and whole-run summaries.

use std::collections::BTreeMap;

use adintel_core::{CreativeRecord, EntitySummary, PeriodSummary};
use chrono::{Datelike, Duration, NaiveDate};

use crate::ranking::Tally;

/// Trailing window for "new" and "stopped" counts.
pub const PERIOD_WINDOW_DAYS: i64 = 7;
pub const TRAILING_MONTH_DAYS: i64 = 30;
pub const TOP_CATEGORY_LIMIT: usize = 5;
pub const TOP_CTA_LIMIT: usize = 10;

/// `true` when `date` is known and on or after `reference - days`.
fn within(date: Option<NaiveDate>, reference: NaiveDate, days: i64) -> bool {
    date.is_some_and(|d| d >= reference - Duration::days(days))
}

fn breakdown<'a, I>(labels: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    labels.into_iter().collect::<Tally>().into_map()
}

/// Summarizes one advertiser's records.
///
/// Classification breakdowns only count records carrying that label, and the
/// mean only covers records with a known `days_active`.
#[must_use]
pub fn entity_summary(
    entity_id: &str,
    entity_name: &str,
    records: &[&CreativeRecord],
    reference_date: NaiveDate,
) -> EntitySummary {
    let days: Vec<i64> = records.iter().filter_map(|r| r.days_active).collect();
    #[allow(clippy::cast_precision_loss)]
    let avg_days_active = if days.is_empty() {
        None
    } else {
        Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
    };

    EntitySummary {
        entity_id: entity_id.to_owned(),
        entity_name: entity_name.to_owned(),
        total: records.len(),
        active: records.iter().filter(|r| r.is_active).count(),
        media_breakdown: breakdown(records.iter().map(|r| r.media_kind.as_str())),
        angle_breakdown: breakdown(records.iter().filter_map(|r| r.angle.map(|a| a.as_str()))),
        hook_breakdown: breakdown(records.iter().filter_map(|r| r.hook.map(|h| h.as_str()))),
        offer_breakdown: breakdown(records.iter().filter_map(|r| r.offer.map(|o| o.as_str()))),
        cta_breakdown: breakdown(records.iter().filter_map(|r| r.cta_text.as_deref())),
        avg_days_active,
        new_last_7_days: records
            .iter()
            .filter(|r| within(r.started_on, reference_date, PERIOD_WINDOW_DAYS))
            .count(),
        new_last_30_days: records
            .iter()
            .filter(|r| within(r.started_on, reference_date, TRAILING_MONTH_DAYS))
            .count(),
    }
}

/// Builds the run-wide summary from every record plus the per-advertiser
/// summaries already computed for them.
#[must_use]
pub fn period_summary(
    records: &[&CreativeRecord],
    entity_summaries: Vec<EntitySummary>,
    reference_date: NaiveDate,
) -> PeriodSummary {
    let mut angles = Tally::new();
    let mut hooks = Tally::new();
    let mut offers = Tally::new();
    let mut ctas = Tally::new();
    let mut media = Tally::new();
    let mut new_this_period = 0;
    let mut stopped_this_period = 0;

    for record in records {
        if let Some(angle) = record.angle {
            angles.add(angle.as_str());
        }
        if let Some(hook) = record.hook {
            hooks.add(hook.as_str());
        }
        if let Some(offer) = record.offer {
            offers.add(offer.as_str());
        }
        if let Some(cta) = record.cta_text.as_deref() {
            ctas.add(cta);
        }
        media.add(record.media_kind.as_str());

        if within(record.started_on, reference_date, PERIOD_WINDOW_DAYS) {
            new_this_period += 1;
        }
        if within(record.ended_on, reference_date, PERIOD_WINDOW_DAYS) {
            stopped_this_period += 1;
        }
    }

    PeriodSummary {
        report_date: reference_date,
        report_week: reference_date.iso_week().week(),
        entity_count: entity_summaries.len(),
        total_records: records.len(),
        new_this_period,
        stopped_this_period,
        top_angles: angles.ranked(TOP_CATEGORY_LIMIT),
        top_hooks: hooks.ranked(TOP_CATEGORY_LIMIT),
        top_offers: offers.ranked(TOP_CATEGORY_LIMIT),
        top_ctas: ctas.ranked(TOP_CTA_LIMIT),
        media_distribution: media.into_map(),
        entity_summaries,
    }
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
