//! `report` command: rebuilds the period summary from a stored run.

use std::path::Path;

use adintel_core::{CreativeRecord, PeriodSummary};
use adintel_trends::RunContext;
use anyhow::Context;
use chrono::{NaiveDate, Utc};

/// Reads a JSON Lines file of creatives. Blank lines are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not a valid
/// creative; the message names the offending line.
pub(crate) async fn read_records(path: &Path) -> anyhow::Result<Vec<CreativeRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<CreativeRecord>(line)
                .with_context(|| format!("{}:{}: invalid creative", path.display(), i + 1))
        })
        .collect()
}

/// Aggregates `records` as of `reference_date`. `None` for an empty dataset.
pub(crate) fn summarize_records(
    records: Vec<CreativeRecord>,
    reference_date: NaiveDate,
) -> Option<PeriodSummary> {
    let context: RunContext = records.into_iter().collect();
    context.summarize(reference_date).1
}

/// Prints the period summary for `input` as pretty JSON.
///
/// # Errors
///
/// Returns an error if the dataset cannot be read or serialized.
pub(crate) async fn run_report(input: &Path, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let records = read_records(input).await?;
    let reference_date = date.unwrap_or_else(|| Utc::now().date_naive());
    tracing::debug!(records = records.len(), %reference_date, "re-aggregating dataset");

    match summarize_records(records, reference_date) {
        Some(period) => println!("{}", serde_json::to_string_pretty(&period)?),
        None => println!("no creatives found in {}", input.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adintel_core::MediaKind;
    use chrono::TimeZone;
    use std::io::Write;

    fn record(ad_id: &str, entity_id: &str, started_on: &str) -> CreativeRecord {
        let collected_at = Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap();
        let mut record = CreativeRecord::new(ad_id, entity_id, "Brand", "US", collected_at);
        record.started_on = Some(started_on.parse().unwrap());
        record.media_kind = MediaKind::Image;
        record.cta_text = Some("Shop Now".to_owned());
        record
    }

    fn write_jsonl(records: &[CreativeRecord]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for record in records {
            writeln!(file, "{}", serde_json::to_string(record).unwrap()).unwrap();
        }
        writeln!(file).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_records_and_skips_blank_lines() {
        let file = write_jsonl(&[
            record("ad_1", "page_1", "2024-06-10"),
            record("ad_2", "page_2", "2024-05-01"),
        ]);

        let records = read_records(file.path()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].ad_id, "ad_2");
    }

    #[tokio::test]
    async fn invalid_line_is_reported_with_its_number() {
        let mut file = write_jsonl(&[record("ad_1", "page_1", "2024-06-10")]);
        writeln!(file, "{{not json").unwrap();

        let err = read_records(file.path()).await.unwrap_err();

        assert!(err.to_string().ends_with(":3: invalid creative"), "{err}");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_records(&dir.path().join("absent.jsonl"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn report_over_a_stored_dataset_succeeds() {
        let file = write_jsonl(&[record("ad_1", "page_1", "2024-06-10")]);
        let date = NaiveDate::from_ymd_opt(2024, 6, 15);

        run_report(file.path(), date).await.unwrap();
    }

    #[test]
    fn summary_uses_the_given_reference_date() {
        let records = vec![
            record("ad_1", "page_1", "2024-06-10"),
            record("ad_2", "page_2", "2024-05-01"),
        ];
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let period = summarize_records(records, date).unwrap();

        assert_eq!(period.report_date, date);
        assert_eq!(period.total_records, 2);
        assert_eq!(period.entity_count, 2);
        assert_eq!(period.new_this_period, 1);
        assert_eq!(period.top_ctas, vec![("Shop Now".to_owned(), 2)]);
    }

    #[test]
    fn empty_dataset_has_no_summary() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(summarize_records(Vec::new(), date).is_none());
    }
}
