//! Classify-then-aggregate over a small advertiser, the way a run does it.

use adintel_classifier::classify_record;
use adintel_core::{AdAngle, CreativeRecord, HookStyle, MediaKind, OfferType};
use adintel_trends::RunContext;
use chrono::{Duration, NaiveDate, Utc};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn creative(
    id: &str,
    body: &str,
    started_days_ago: i64,
    media: MediaKind,
    cta: &str,
) -> CreativeRecord {
    let mut r = CreativeRecord::new(id, "page_1", "Test Brand", "US", Utc::now());
    r.body_text = Some(body.to_owned());
    r.started_on = Some(today() - Duration::days(started_days_ago));
    r.media_kind = media;
    r.cta_text = Some(cta.to_owned());
    classify_record(&mut r, today());
    r
}

#[test]
fn page_1_classified_and_summarized() {
    let first = creative(
        "ad_1",
        "Are you ready for summer? Get 25% off with our seasonal sale",
        5,
        MediaKind::Image,
        "Shop Now",
    );
    let second = creative(
        "ad_2",
        "Do you need a new look? Limited time only, hurry before it ends soon",
        10,
        MediaKind::Video,
        "Learn More",
    );

    assert_eq!(first.angle, Some(AdAngle::Discount));
    assert_eq!(first.hook, Some(HookStyle::Question));
    assert_eq!(first.offer, Some(OfferType::PercentageOff));
    assert_eq!(second.angle, Some(AdAngle::Urgency));
    assert_eq!(second.hook, Some(HookStyle::Question));
    assert_eq!(second.offer, Some(OfferType::LimitedTime));

    let ctx: RunContext = vec![first, second].into_iter().collect();
    let (entities, period) = ctx.summarize(today());

    assert_eq!(entities.len(), 1);
    let s = &entities[0];
    assert_eq!(s.entity_id, "page_1");
    assert_eq!(s.total, 2);
    assert_eq!(s.active, 2);
    assert_eq!(s.media_breakdown.get("image"), Some(&1));
    assert_eq!(s.media_breakdown.get("video"), Some(&1));
    assert_eq!(s.media_breakdown.len(), 2);
    assert_eq!(s.avg_days_active, Some(7.5));
    assert_eq!(s.new_last_7_days, 1);

    let period = period.unwrap();
    assert_eq!(period.total_records, 2);
    assert_eq!(period.new_this_period, 1);
    assert_eq!(period.top_hooks, vec![("question".to_owned(), 2)]);
    assert_eq!(
        period.top_offers,
        vec![
            ("percentage_off".to_owned(), 1),
            ("limited_time".to_owned(), 1)
        ]
    );
}

#[test]
fn summaries_serialize_with_label_keys() {
    let r = creative("ad_1", "Free shipping on everything", 2, MediaKind::Carousel, "Buy");
    let ctx: RunContext = std::iter::once(r).collect();
    let (_, period) = ctx.summarize(today());
    let json = serde_json::to_value(period.unwrap()).unwrap();
    assert_eq!(json["media_distribution"]["carousel"], 1);
    assert_eq!(json["top_offers"][0][0], "free_shipping");
    assert_eq!(json["report_date"], "2024-06-15");
}
