//! Normalization from [`RawCreative`] to [`CreativeRecord`].
//!
//! Date and range parsing is delegated to [`crate::parse`]; this module
//! handles structural mapping and the run-level options.

use adintel_core::{CreativeRecord, MediaKind};
use chrono::{DateTime, Utc};

use crate::error::ScraperError;
use crate::parse::{parse_date, parse_range};
use crate::types::RawCreative;

/// Run-level values stamped onto every normalized record.
#[derive(Debug, Clone)]
pub struct NormalizeContext<'a> {
    pub entity_id: &'a str,
    pub entity_name: &'a str,
    pub country_code: &'a str,
    /// When `false`, media URLs are discarded whatever the provider returned.
    pub include_media: bool,
    pub collected_at: DateTime<Utc>,
}

/// Normalizes one provider item into a [`CreativeRecord`].
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the item has no usable id.
/// Every other field degrades to `None` or a default instead of failing.
pub fn normalize_creative(
    raw: RawCreative,
    ctx: &NormalizeContext<'_>,
) -> Result<CreativeRecord, ScraperError> {
    let Some(ad_id) = raw.usable_id().map(str::to_owned) else {
        return Err(ScraperError::Normalization {
            ad_id: raw.ad_id,
            reason: "missing ad id".into(),
        });
    };

    let media_kind = detect_media_kind(&raw);
    let started_on = parse_date(raw.start_date.as_deref());
    let ended_on = parse_date(raw.end_date.as_deref());
    let impressions = parse_range(raw.impressions.as_deref());
    let spend = parse_range(raw.spend.as_deref());

    let cta_link = non_empty(raw.cta_link);
    // No explicit landing page: the CTA destination is the best we have.
    let landing_page_url = non_empty(raw.landing_page).or_else(|| cta_link.clone());

    let media_urls = if ctx.include_media {
        raw.media_urls
            .into_iter()
            .filter(|u| !u.trim().is_empty())
            .collect()
    } else {
        Vec::new()
    };

    let mut record = CreativeRecord::new(
        ad_id,
        ctx.entity_id,
        ctx.entity_name,
        ctx.country_code,
        ctx.collected_at,
    );
    record.body_text = non_empty(raw.body_text);
    record.headline = non_empty(raw.headline);
    record.description = non_empty(raw.description);
    record.cta_text = non_empty(raw.cta_text);
    record.cta_link = cta_link;
    record.landing_page_url = landing_page_url;
    record.media_kind = media_kind;
    record.media_urls = media_urls;
    record.is_active = ended_on.is_none();
    record.started_on = started_on;
    record.ended_on = ended_on;
    record.platforms = raw.platforms;
    record.impressions_lower = impressions.map(|(low, _)| to_count(low));
    record.impressions_upper = impressions.map(|(_, high)| to_count(high));
    record.spend_lower = spend.map(|(low, _)| low);
    record.spend_upper = spend.map(|(_, high)| high);

    Ok(record)
}

fn detect_media_kind(raw: &RawCreative) -> MediaKind {
    if raw.is_carousel {
        MediaKind::Carousel
    } else if raw.has_video {
        MediaKind::Video
    } else if raw.has_image {
        MediaKind::Image
    } else {
        MediaKind::Unknown
    }
}

/// Treat empty or whitespace-only strings as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(value: f64) -> u64 {
    value.round().max(0.0) as u64
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
