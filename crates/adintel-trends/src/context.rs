//! Accumulated state for one run.

use std::collections::HashMap;

use adintel_core::{CreativeRecord, EntitySummary, PeriodSummary};
use chrono::NaiveDate;

use crate::aggregate::{entity_summary, period_summary};

#[derive(Debug, Clone)]
struct EntityGroup {
    entity_id: String,
    /// Name on the first record seen for this entity.
    entity_name: String,
    members: Vec<usize>,
}

/// Every record of a run in arrival order, grouped by advertiser.
///
/// Groups are kept in the order their first record arrived, which is also
/// the order of the entity summaries produced by [`RunContext::summarize`].
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    records: Vec<CreativeRecord>,
    groups: Vec<EntityGroup>,
    group_index: HashMap<String, usize>,
}

impl RunContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CreativeRecord) {
        let position = self.records.len();
        let group = match self.group_index.get(&record.entity_id) {
            Some(&g) => g,
            None => {
                let g = self.groups.len();
                self.group_index.insert(record.entity_id.clone(), g);
                self.groups.push(EntityGroup {
                    entity_id: record.entity_id.clone(),
                    entity_name: record.entity_name.clone(),
                    members: Vec::new(),
                });
                g
            }
        };
        self.groups[group].members.push(position);
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[CreativeRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.groups.len()
    }

    /// One summary per entity in first-seen order, plus the period summary.
    /// The period summary is `None` when no records were collected.
    #[must_use]
    pub fn summarize(&self, reference_date: NaiveDate) -> (Vec<EntitySummary>, Option<PeriodSummary>) {
        let entity_summaries: Vec<EntitySummary> = self
            .groups
            .iter()
            .map(|group| {
                let members: Vec<&CreativeRecord> =
                    group.members.iter().map(|&i| &self.records[i]).collect();
                entity_summary(&group.entity_id, &group.entity_name, &members, reference_date)
            })
            .collect();

        if self.records.is_empty() {
            return (entity_summaries, None);
        }

        let all: Vec<&CreativeRecord> = self.records.iter().collect();
        let period = period_summary(&all, entity_summaries.clone(), reference_date);
        tracing::debug!(
            records = period.total_records,
            entities = period.entity_count,
            new = period.new_this_period,
            stopped = period.stopped_this_period,
            "summarized run"
        );
        (entity_summaries, Some(period))
    }
}

impl Extend<CreativeRecord> for RunContext {
    fn extend<I: IntoIterator<Item = CreativeRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

impl FromIterator<CreativeRecord> for RunContext {
    fn from_iter<I: IntoIterator<Item = CreativeRecord>>(iter: I) -> Self {
        let mut ctx = RunContext::new();
        ctx.extend(iter);
        ctx
    }
}
