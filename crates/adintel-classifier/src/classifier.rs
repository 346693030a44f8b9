//! Text classification over the pattern taxonomy.

use adintel_core::{AdAngle, CreativeRecord, HookStyle, OfferType};
use chrono::NaiveDate;
use serde::Serialize;

use crate::taxonomy::{ANGLES, HOOKS, OFFERS};

/// One label per category for a piece of ad copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub angle: AdAngle,
    pub hook: HookStyle,
    pub offer: OfferType,
}

/// Number of matching rules per angle label, in table order.
///
/// Labels with no matching rule are included with a score of zero.
#[must_use]
pub fn angle_scores(text: &str) -> Vec<(AdAngle, usize)> {
    let lower = text.to_lowercase();
    ANGLES
        .iter()
        .map(|(angle, rules)| {
            let score = rules.iter().filter(|re| re.is_match(&lower)).count();
            (*angle, score)
        })
        .collect()
}

/// Picks the angle with the strictly highest rule-match count.
///
/// Ties go to the label listed first in the taxonomy. Empty text, or text
/// matching no rule, yields [`AdAngle::Unknown`].
#[must_use]
pub fn classify_angle(text: &str) -> AdAngle {
    if text.is_empty() {
        return AdAngle::Unknown;
    }

    let mut best = AdAngle::Unknown;
    let mut best_score = 0usize;
    for (angle, score) in angle_scores(text) {
        if score > best_score {
            best = angle;
            best_score = score;
        }
    }
    best
}

/// First sentence of the first line, trimmed.
///
/// Sentences end at `.`, `!` or `?`. Text without a terminator is returned
/// whole.
#[must_use]
pub fn first_sentence(text: &str) -> &str {
    let first_line = text.lines().next().unwrap_or("").trim();
    first_line
        .split(['.', '!', '?'])
        .next()
        .unwrap_or("")
        .trim()
}

/// Classifies the opening hook. First matching rule wins.
#[must_use]
pub fn classify_hook(text: &str) -> HookStyle {
    if text.is_empty() {
        return HookStyle::Unknown;
    }

    let fragment = first_sentence(text).to_lowercase();
    HOOKS
        .iter()
        .find(|(_, rules)| rules.iter().any(|re| re.is_match(&fragment)))
        .map_or(HookStyle::Unknown, |(style, _)| *style)
}

/// Classifies the offer mechanism. First matching rule wins.
///
/// Empty text yields [`OfferType::Unknown`]; non-empty text with no match
/// yields [`OfferType::NoOffer`].
#[must_use]
pub fn classify_offer(text: &str) -> OfferType {
    if text.is_empty() {
        return OfferType::Unknown;
    }

    let lower = text.to_lowercase();
    OFFERS
        .iter()
        .find(|(_, rules)| rules.iter().any(|re| re.is_match(&lower)))
        .map_or(OfferType::NoOffer, |(offer, _)| *offer)
}

#[must_use]
pub fn classify_text(text: &str) -> Classification {
    Classification {
        angle: classify_angle(text),
        hook: classify_hook(text),
        offer: classify_offer(text),
    }
}

/// Whole days from `started_on` to `ended_on`, or to `today` while the ad
/// is still running. `None` without a start date. Never negative.
#[must_use]
pub fn days_active(
    started_on: Option<NaiveDate>,
    ended_on: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<i64> {
    let start = started_on?;
    let end = ended_on.unwrap_or(today);
    Some((end - start).num_days().max(0))
}

/// Fills the three labels and `days_active` on `record` in place.
pub fn classify_record(record: &mut CreativeRecord, today: NaiveDate) {
    let text = record.combined_text();
    let labels = classify_text(&text);

    record.angle = Some(labels.angle);
    record.hook = Some(labels.hook);
    record.offer = Some(labels.offer);
    record.days_active = days_active(record.started_on, record.ended_on, today);

    tracing::trace!(
        ad_id = %record.ad_id,
        angle = %labels.angle,
        hook = %labels.hook,
        offer = %labels.offer,
        "classified creative"
    );
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
