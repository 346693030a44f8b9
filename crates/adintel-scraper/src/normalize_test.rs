use chrono::NaiveDate;

use super::*;

fn ctx(include_media: bool) -> NormalizeContext<'static> {
    NormalizeContext {
        entity_id: "page_1",
        entity_name: "Test Brand",
        country_code: "US",
        include_media,
        collected_at: Utc::now(),
    }
}

fn raw(id: &str) -> RawCreative {
    RawCreative {
        ad_id: Some(id.to_owned()),
        ..RawCreative::default()
    }
}

#[test]
fn stamps_context_onto_record() {
    let record = normalize_creative(raw("42"), &ctx(true)).unwrap();
    assert_eq!(record.ad_id, "42");
    assert_eq!(record.entity_id, "page_1");
    assert_eq!(record.entity_name, "Test Brand");
    assert_eq!(record.country_code, "US");
    assert!(record.angle.is_none());
    assert!(record.days_active.is_none());
}

#[test]
fn missing_id_is_a_normalization_error() {
    let err = normalize_creative(RawCreative::default(), &ctx(true)).unwrap_err();
    assert!(matches!(err, ScraperError::Normalization { .. }));
    let err = normalize_creative(raw("  "), &ctx(true)).unwrap_err();
    assert!(matches!(err, ScraperError::Normalization { .. }));
}

#[test]
fn landing_page_falls_back_to_cta_link() {
    let mut item = raw("1");
    item.cta_link = Some("https://shop.example.com/sale".to_owned());
    let record = normalize_creative(item, &ctx(true)).unwrap();
    assert_eq!(
        record.landing_page_url.as_deref(),
        Some("https://shop.example.com/sale")
    );
}

#[test]
fn explicit_landing_page_wins_over_cta_link() {
    let mut item = raw("1");
    item.cta_link = Some("https://l.example.com/redirect".to_owned());
    item.landing_page = Some("https://shop.example.com/".to_owned());
    let record = normalize_creative(item, &ctx(true)).unwrap();
    assert_eq!(
        record.landing_page_url.as_deref(),
        Some("https://shop.example.com/")
    );
    assert_eq!(
        record.cta_link.as_deref(),
        Some("https://l.example.com/redirect")
    );
}

#[test]
fn media_urls_dropped_when_capture_disabled() {
    let mut item = raw("1");
    item.has_image = true;
    item.media_urls = vec!["https://scontent.example.com/a.jpg".to_owned()];
    let record = normalize_creative(item.clone(), &ctx(false)).unwrap();
    assert!(record.media_urls.is_empty());
    assert_eq!(record.media_kind, MediaKind::Image);

    let record = normalize_creative(item, &ctx(true)).unwrap();
    assert_eq!(record.media_urls.len(), 1);
}

#[test]
fn media_kind_precedence() {
    let mut item = raw("1");
    item.has_image = true;
    item.has_video = true;
    assert_eq!(
        normalize_creative(item.clone(), &ctx(true)).unwrap().media_kind,
        MediaKind::Video
    );
    item.is_carousel = true;
    assert_eq!(
        normalize_creative(item, &ctx(true)).unwrap().media_kind,
        MediaKind::Carousel
    );
    assert_eq!(
        normalize_creative(raw("2"), &ctx(true)).unwrap().media_kind,
        MediaKind::Unknown
    );
}

#[test]
fn end_date_marks_record_inactive() {
    let mut item = raw("1");
    item.start_date = Some("Jan 1, 2024".to_owned());
    item.end_date = Some("2024-01-31".to_owned());
    let record = normalize_creative(item, &ctx(true)).unwrap();
    assert!(!record.is_active);
    assert_eq!(record.started_on, NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(record.ended_on, NaiveDate::from_ymd_opt(2024, 1, 31));
}

#[test]
fn unparseable_dates_stay_unknown_and_active() {
    let mut item = raw("1");
    item.start_date = Some("sometime last spring".to_owned());
    item.end_date = Some("??".to_owned());
    let record = normalize_creative(item, &ctx(true)).unwrap();
    assert!(record.started_on.is_none());
    assert!(record.ended_on.is_none());
    assert!(record.is_active);
}

#[test]
fn parses_impression_and_spend_ranges() {
    let mut item = raw("1");
    item.impressions = Some("1K-5K".to_owned());
    item.spend = Some("$100 – $499".to_owned());
    let record = normalize_creative(item, &ctx(true)).unwrap();
    assert_eq!(record.impressions_lower, Some(1_000));
    assert_eq!(record.impressions_upper, Some(5_000));
    assert_eq!(record.spend_lower, Some(100.0));
    assert_eq!(record.spend_upper, Some(499.0));
}

#[test]
fn unparseable_ranges_leave_both_bounds_absent() {
    let mut item = raw("1");
    item.impressions = Some("<1K".to_owned());
    let record = normalize_creative(item, &ctx(true)).unwrap();
    assert!(record.impressions_lower.is_none());
    assert!(record.impressions_upper.is_none());
}

#[test]
fn empty_text_fields_become_none() {
    let mut item = raw("1");
    item.body_text = Some("   ".to_owned());
    item.headline = Some(String::new());
    item.cta_text = Some(" Shop Now ".to_owned());
    let record = normalize_creative(item, &ctx(true)).unwrap();
    assert!(record.body_text.is_none());
    assert!(record.headline.is_none());
    assert_eq!(record.cta_text.as_deref(), Some("Shop Now"));
}
