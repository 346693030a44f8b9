//! Label counting that remembers first appearance.

use std::collections::{BTreeMap, HashMap};

use adintel_core::Ranking;

/// Counts labels in the order they were first seen.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        if let Some(&i) = self.index.get(label) {
            self.counts[i].1 += 1;
        } else {
            self.index.insert(label.to_owned(), self.counts.len());
            self.counts.push((label.to_owned(), 1));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Highest counts first; equal counts keep first-seen order.
    #[must_use]
    pub fn ranked(&self, k: usize) -> Ranking {
        let mut ranked = self.counts.clone();
        // `sort_by` is stable, which is what keeps ties in first-seen order.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, usize> {
        self.counts.into_iter().collect()
    }
}

impl<'a> FromIterator<&'a str> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for label in iter {
            tally.add(label);
        }
        tally
    }
}

/// Top `k` labels of `labels` by count, ties by first appearance.
pub fn top_k<'a, I>(labels: I, k: usize) -> Ranking
where
    I: IntoIterator<Item = &'a str>,
{
    labels.into_iter().collect::<Tally>().ranked(k)
}
