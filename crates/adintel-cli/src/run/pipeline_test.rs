use std::sync::Mutex;

use adintel_core::{
    entity_summary_key, AdAngle, CreativeRecord, EntitySummary, HookStyle, OfferType,
    PeriodSummary, RecordSink, RunConfig, SinkError, PERIOD_SUMMARY_KEY,
};
use adintel_scraper::{ReplayFixture, ReplayProvider, TerminalState};
use async_trait::async_trait;
use chrono::NaiveDate;

use super::*;

const FIXTURE: &str = r#"{
  "targets": {
    "page_1": {
      "entity_name": "Test Brand",
      "pages": [
        [
          {
            "ad_id": "ad_1",
            "body_text": "Are you ready for summer? Get 25% off with our seasonal sale",
            "cta_text": "Shop Now",
            "start_date": "2024-06-10",
            "has_image": true
          }
        ],
        [
          {
            "ad_id": "ad_2",
            "body_text": "Do you need a new look? Limited time only, hurry before it ends soon",
            "cta_text": "Learn More",
            "start_date": "Started running on Jun 5, 2024",
            "has_video": true
          }
        ]
      ]
    },
    "summer": {
      "pages": [
        [
          { "ad_id": "ad_1", "body_text": "Are you ready for summer? Get 25% off" },
          { "ad_id": "ad_9", "body_text": "Free shipping on every order", "is_carousel": true }
        ]
      ]
    }
  }
}"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn provider() -> ReplayProvider {
    ReplayProvider::new(ReplayFixture::parse(FIXTURE).unwrap())
}

fn config() -> RunConfig {
    RunConfig {
        advertiser_ids: vec!["page_1".to_owned()],
        search_terms: vec!["summer".to_owned()],
        settle_delay_ms: 0,
        ..RunConfig::default()
    }
}

#[derive(Default)]
struct MemorySink {
    records: Mutex<Vec<CreativeRecord>>,
    entity_keys: Mutex<Vec<String>>,
    entities: Mutex<Vec<EntitySummary>>,
    periods: Mutex<Vec<PeriodSummary>>,
}

impl MemorySink {
    fn ad_ids(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.ad_id.clone())
            .collect()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn put_record(&self, record: &CreativeRecord) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn put_entity_summary(&self, summary: &EntitySummary) -> Result<(), SinkError> {
        self.entity_keys
            .lock()
            .unwrap()
            .push(entity_summary_key(&summary.entity_id));
        self.entities.lock().unwrap().push(summary.clone());
        Ok(())
    }

    async fn put_period_summary(&self, summary: &PeriodSummary) -> Result<(), SinkError> {
        self.periods.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

/// Rejects every creative.
struct RejectingSink;

#[async_trait]
impl RecordSink for RejectingSink {
    async fn put_record(&self, _record: &CreativeRecord) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::other("disk full")))
    }

    async fn put_entity_summary(&self, _summary: &EntitySummary) -> Result<(), SinkError> {
        Ok(())
    }

    async fn put_period_summary(&self, _summary: &PeriodSummary) -> Result<(), SinkError> {
        Ok(())
    }
}

#[tokio::test]
async fn replayed_run_stores_records_then_summaries() {
    let sink = MemorySink::default();

    let outcome = run_pipeline(&config(), provider(), &sink, today())
        .await
        .unwrap();

    assert_eq!(outcome.reports.len(), 2);
    assert!(outcome
        .reports
        .iter()
        .all(|r| r.state == TerminalState::Converged));
    assert_eq!(outcome.records_written, 3);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(outcome.rejected, 0);
    assert_eq!(sink.ad_ids(), ["ad_1", "ad_2", "ad_9"]);

    assert_eq!(
        *sink.entity_keys.lock().unwrap(),
        ["advertiser_page_1", "advertiser_"]
    );
    let entities = sink.entities.lock().unwrap();
    let page = &entities[0];
    assert_eq!(page.entity_name, "Test Brand");
    assert_eq!(page.total, 2);
    assert_eq!(page.active, 2);
    assert_eq!(page.media_breakdown.get("image"), Some(&1));
    assert_eq!(page.media_breakdown.get("video"), Some(&1));
    assert_eq!(page.avg_days_active, Some(7.5));
    assert_eq!(page.new_last_7_days, 1);
    assert_eq!(entities[1].entity_name, "Search: summer");

    let periods = sink.periods.lock().unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].total_records, 3);
    assert_eq!(periods[0].entity_count, 2);
    assert_eq!(periods[0].report_date, today());
    assert_eq!(outcome.period.as_ref(), Some(&periods[0]));
    assert!(!outcome.all_failed());
}

#[tokio::test]
async fn records_are_classified_against_the_run_date() {
    let sink = MemorySink::default();
    run_pipeline(&config(), provider(), &sink, today())
        .await
        .unwrap();

    let records = sink.records.lock().unwrap();
    assert_eq!(records[0].angle, Some(AdAngle::Discount));
    assert_eq!(records[0].hook, Some(HookStyle::Question));
    assert_eq!(records[0].offer, Some(OfferType::PercentageOff));
    assert_eq!(records[0].days_active, Some(5));
    assert_eq!(records[1].days_active, Some(10));
    assert_eq!(records[2].offer, Some(OfferType::FreeShipping));
    assert_eq!(records[2].days_active, None);
}

#[tokio::test]
async fn classification_can_be_switched_off() {
    let sink = MemorySink::default();
    let config = RunConfig {
        classify_ads: false,
        ..config()
    };

    run_pipeline(&config, provider(), &sink, today())
        .await
        .unwrap();

    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records
        .iter()
        .all(|r| r.angle.is_none() && r.hook.is_none() && r.offer.is_none()));
    assert!(records.iter().all(|r| r.days_active.is_none()));

    let entities = sink.entities.lock().unwrap();
    assert!(entities[0].angle_breakdown.is_empty());
    assert_eq!(entities[0].avg_days_active, None);
}

#[tokio::test]
async fn cap_applies_per_target() {
    let sink = MemorySink::default();
    let config = RunConfig {
        max_ads_per_target: 1,
        ..config()
    };

    let outcome = run_pipeline(&config, provider(), &sink, today())
        .await
        .unwrap();

    assert!(outcome
        .reports
        .iter()
        .all(|r| r.state == TerminalState::Capped && r.emitted == 1));
    // The search target's only emitted item repeats ad_1.
    assert_eq!(sink.ad_ids(), ["ad_1"]);
    assert_eq!(outcome.duplicates, 1);
}

#[tokio::test]
async fn unrecorded_target_fails_without_stopping_the_run() {
    let sink = MemorySink::default();
    let mut config = config();
    config.advertiser_ids.push("page_404".to_owned());

    let outcome = run_pipeline(&config, provider(), &sink, today())
        .await
        .unwrap();

    assert_eq!(outcome.failed_targets(), 1);
    assert_eq!(outcome.reports[1].state, TerminalState::Failed);
    assert!(!outcome.all_failed());
    assert_eq!(outcome.records_written, 3);
}

#[tokio::test]
async fn every_target_failing_is_flagged_and_writes_no_period_summary() {
    let sink = MemorySink::default();
    let config = RunConfig {
        advertiser_ids: vec!["page_404".to_owned()],
        search_terms: Vec::new(),
        ..config()
    };

    let outcome = run_pipeline(&config, provider(), &sink, today())
        .await
        .unwrap();

    assert!(outcome.all_failed());
    assert_eq!(outcome.records_written, 0);
    assert!(outcome.period.is_none());
    assert!(sink.entities.lock().unwrap().is_empty());
    assert!(sink.periods.lock().unwrap().is_empty());
}

#[tokio::test]
async fn sink_error_fails_the_pipeline() {
    let err = run_pipeline(&config(), provider(), &RejectingSink, today())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("disk full"));
}

#[test]
fn period_key_is_stable() {
    assert_eq!(PERIOD_SUMMARY_KEY, "weekly_summary");
}

#[tokio::test]
async fn bundled_sample_config_and_fixture_run_cleanly() {
    let config = adintel_core::parse_run_config(include_str!("../../../../config/run.yaml")).unwrap();
    let fixture = ReplayFixture::parse(include_str!("../../../../fixtures/replay.json")).unwrap();
    let sink = MemorySink::default();

    let outcome = run_pipeline(&config, ReplayProvider::new(fixture), &sink, today())
        .await
        .unwrap();

    assert_eq!(outcome.failed_targets(), 0);
    // Two sessions run at once, so arrival order across targets may vary.
    let mut ids = sink.ad_ids();
    ids.sort();
    assert_eq!(ids, ["238470112", "238470113", "238470114", "901223344"]);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(outcome.reports[0].dropped, 1);
    assert_eq!(outcome.reports[0].entity_name, "Tidy Desk Co.");
}
