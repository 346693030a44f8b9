//! Bounded, deduplicating collection over a [`PageProvider`].
//!
//! Each target runs its own session: render, then alternate between
//! extracting newly visible items and advancing the listing until the
//! per-target cap is hit or the listing stops growing. A target that fails
//! or times out is reported and skipped; the run carries on.

use std::collections::HashSet;
use std::time::Duration;

use adintel_core::RunConfig;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;

use crate::error::ScraperError;
use crate::provider::PageProvider;
use crate::types::{RawCreative, Target};
use crate::url::build_search_url;

/// Consecutive advances with an unchanged size probe before a listing is
/// considered exhausted.
pub const MAX_CONSECUTIVE_STALLS: u32 = 3;

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Items emitted per target before stopping.
    pub max_items: usize,
    pub settle_delay: Duration,
    /// Budget for one target's whole session.
    pub target_timeout: Duration,
    /// Simultaneous provider sessions.
    pub max_concurrent: usize,
}

impl CollectorSettings {
    #[must_use]
    pub fn from_run_config(config: &RunConfig) -> Self {
        Self {
            max_items: config.max_ads_per_target,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            target_timeout: Duration::from_secs(config.target_timeout_secs),
            max_concurrent: config.max_concurrent_sessions.max(1),
        }
    }
}

/// How a target's session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// The listing stopped growing.
    Converged,
    /// The per-target cap was reached.
    Capped,
    /// Provider error, timeout, or closed output.
    Failed,
}

impl TerminalState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TerminalState::Converged => "converged",
            TerminalState::Capped => "capped",
            TerminalState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TerminalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one target.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: Target,
    pub entity_name: String,
    pub state: TerminalState,
    /// Items sent downstream. Never exceeds the cap.
    pub emitted: usize,
    /// Items skipped for a missing or repeated id.
    pub dropped: usize,
    pub error: Option<String>,
}

/// A raw item tagged with the target it came from.
#[derive(Debug, Clone)]
pub struct CollectedCreative {
    pub entity_id: String,
    pub entity_name: String,
    pub raw: RawCreative,
}

/// Counters that outlive a timed-out session future.
#[derive(Debug, Default)]
struct Progress {
    entity_name: Option<String>,
    emitted: usize,
    dropped: usize,
}

pub struct Collector<P> {
    provider: P,
    settings: CollectorSettings,
}

impl<P: PageProvider> Collector<P> {
    pub fn new(provider: P, settings: CollectorSettings) -> Self {
        Self { provider, settings }
    }

    /// Collection order: every advertiser id, then every search term.
    #[must_use]
    pub fn targets(config: &RunConfig) -> Vec<Target> {
        config
            .advertiser_ids
            .iter()
            .cloned()
            .map(Target::Advertiser)
            .chain(config.search_terms.iter().cloned().map(Target::Search))
            .collect()
    }

    /// Collects every target in `config`, sending items to `tx`.
    ///
    /// Up to `max_concurrent` targets run at once. Reports come back in
    /// target order regardless of completion order.
    pub async fn collect_all(
        &self,
        config: &RunConfig,
        tx: mpsc::Sender<CollectedCreative>,
    ) -> Vec<TargetReport> {
        let targets = Self::targets(config);
        tracing::info!(
            targets = targets.len(),
            max_concurrent = self.settings.max_concurrent,
            "starting collection"
        );

        let reports: Vec<TargetReport> = stream::iter(targets)
            .map(|target| {
                let url = build_search_url(config, &target);
                let tx = tx.clone();
                async move { self.collect_target(target, &url, &tx).await }
            })
            .buffered(self.settings.max_concurrent)
            .collect()
            .await;

        let failed = reports
            .iter()
            .filter(|r| r.state == TerminalState::Failed)
            .count();
        tracing::info!(
            targets = reports.len(),
            failed,
            emitted = reports.iter().map(|r| r.emitted).sum::<usize>(),
            "collection finished"
        );
        reports
    }

    /// Runs one target's session to a terminal state. Never returns an
    /// error: failures are folded into the report.
    pub async fn collect_target(
        &self,
        target: Target,
        url: &str,
        tx: &mpsc::Sender<CollectedCreative>,
    ) -> TargetReport {
        tracing::debug!(%target, url, "collecting target");
        let mut progress = Progress::default();

        let outcome = tokio::time::timeout(
            self.settings.target_timeout,
            self.run_session(&target, url, tx, &mut progress),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ScraperError::TargetTimeout {
                timeout_secs: self.settings.target_timeout.as_secs(),
            })
        });

        let entity_name = progress
            .entity_name
            .unwrap_or_else(|| target.fallback_name());
        let (state, error) = match outcome {
            Ok(state) => (state, None),
            Err(e) => {
                tracing::warn!(%target, error = %e, emitted = progress.emitted, "target failed");
                (TerminalState::Failed, Some(e.to_string()))
            }
        };

        tracing::info!(
            %target,
            state = %state,
            emitted = progress.emitted,
            dropped = progress.dropped,
            "target finished"
        );
        TargetReport {
            target,
            entity_name,
            state,
            emitted: progress.emitted,
            dropped: progress.dropped,
            error,
        }
    }

    async fn run_session(
        &self,
        target: &Target,
        url: &str,
        tx: &mpsc::Sender<CollectedCreative>,
        progress: &mut Progress,
    ) -> Result<TerminalState, ScraperError> {
        let session = self.provider.render(url).await?;
        let result = self.scroll(&session, target, tx, progress).await;
        self.provider.close(session).await;
        result
    }

    /// Advertiser targets take the page's own name when the provider can
    /// read one. Search targets always use `Search: <term>`. A failed lookup
    /// falls back instead of failing the target.
    async fn resolve_entity_name(&self, session: &P::Session, target: &Target) -> String {
        if let Target::Advertiser(_) = target {
            match self.provider.entity_name(session).await {
                Ok(Some(name)) if !name.trim().is_empty() => return name.trim().to_owned(),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(%target, error = %e, "entity name lookup failed; using fallback");
                }
            }
        }
        target.fallback_name()
    }

    async fn scroll(
        &self,
        session: &P::Session,
        target: &Target,
        tx: &mpsc::Sender<CollectedCreative>,
        progress: &mut Progress,
    ) -> Result<TerminalState, ScraperError> {
        let entity_name = self.resolve_entity_name(session, target).await;
        progress.entity_name = Some(entity_name.clone());

        let mut cursor = 0usize;
        let mut seen: HashSet<String> = HashSet::new();
        let mut stalls = 0u32;

        loop {
            let items = self.provider.extract_visible_items(session).await?;

            for raw in items.into_iter().skip(cursor) {
                cursor += 1;
                let Some(id) = raw.usable_id().map(str::to_owned) else {
                    progress.dropped += 1;
                    tracing::debug!(%target, position = cursor, "dropping item without id");
                    continue;
                };
                if !seen.insert(id.clone()) {
                    progress.dropped += 1;
                    tracing::debug!(%target, ad_id = %id, "dropping repeated item");
                    continue;
                }

                let item = CollectedCreative {
                    entity_id: target.entity_id().to_owned(),
                    entity_name: entity_name.clone(),
                    raw,
                };
                tx.send(item).await.map_err(|_| ScraperError::OutputClosed)?;
                progress.emitted += 1;

                if progress.emitted >= self.settings.max_items {
                    return Ok(TerminalState::Capped);
                }
            }

            let before = self.provider.probe_size(session).await?;
            self.provider.advance(session).await?;
            tokio::time::sleep(self.settings.settle_delay).await;
            let after = self.provider.probe_size(session).await?;

            if after == before {
                stalls += 1;
                tracing::trace!(%target, stalls, size = after, "advance made no progress");
                if stalls >= MAX_CONSECUTIVE_STALLS {
                    return Ok(TerminalState::Converged);
                }
            } else {
                stalls = 0;
            }
        }
    }
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
