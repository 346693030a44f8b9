//! A [`PageProvider`] that replays recorded listings from a JSON fixture.
//!
//! ```json
//! {
//!   "targets": {
//!     "123456789": {
//!       "entity_name": "Acme Co",
//!       "pages": [[{ "ad_id": "1", "body_text": "..." }], [{ "ad_id": "2" }]]
//!     },
//!     "running shoes": { "pages": [[{ "ad_id": "3" }]] }
//!   }
//! }
//! ```
//!
//! Keys are advertiser page ids or search terms. The first page is visible
//! after render; each advance reveals one more page. The size probe is the
//! number of visible items, so an empty page in the recording reads as a
//! scroll that loaded nothing.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ScraperError};
use crate::provider::PageProvider;
use crate::types::RawCreative;
use crate::url::query_param;

/// One recorded listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    pub entity_name: Option<String>,
    pub pages: Vec<Vec<RawCreative>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayFixture {
    pub targets: BTreeMap<String, ReplayScript>,
}

impl ReplayFixture {
    /// # Errors
    ///
    /// Returns [`ScraperError::FixtureParse`] if `json` is not a fixture.
    pub fn parse(json: &str) -> Result<Self, ScraperError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::FixtureIo`] or [`ScraperError::FixtureParse`].
    pub fn from_path(path: &Path) -> Result<Self, ScraperError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ScraperError::FixtureIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }
}

pub struct ReplaySession {
    key: String,
    script: ReplayScript,
    revealed: AtomicUsize,
}

impl ReplaySession {
    fn visible(&self) -> Vec<RawCreative> {
        let revealed = self
            .revealed
            .load(Ordering::SeqCst)
            .min(self.script.pages.len());
        self.script.pages[..revealed].concat()
    }
}

pub struct ReplayProvider {
    fixture: ReplayFixture,
}

impl ReplayProvider {
    #[must_use]
    pub fn new(fixture: ReplayFixture) -> Self {
        Self { fixture }
    }

    /// # Errors
    ///
    /// See [`ReplayFixture::from_path`].
    pub fn from_path(path: &Path) -> Result<Self, ScraperError> {
        Ok(Self::new(ReplayFixture::from_path(path)?))
    }

    #[must_use]
    pub fn fixture(&self) -> &ReplayFixture {
        &self.fixture
    }
}

#[async_trait]
impl PageProvider for ReplayProvider {
    type Session = ReplaySession;

    async fn render(&self, url: &str) -> Result<ReplaySession, ProviderError> {
        let key = query_param(url, "view_all_page_id")
            .or_else(|| query_param(url, "q"))
            .ok_or_else(|| ProviderError::Other(format!("no target in url {url}")))?;
        let script = self
            .fixture
            .targets
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::Other(format!("no recorded listing for {key:?}")))?;

        tracing::debug!(key = %key, pages = script.pages.len(), "replaying listing");
        Ok(ReplaySession {
            key,
            script,
            revealed: AtomicUsize::new(1),
        })
    }

    async fn extract_visible_items(
        &self,
        session: &ReplaySession,
    ) -> Result<Vec<RawCreative>, ProviderError> {
        Ok(session.visible())
    }

    async fn advance(&self, session: &ReplaySession) -> Result<(), ProviderError> {
        let total = session.script.pages.len();
        // Err means the last page is already showing; advancing is a no-op.
        if session
            .revealed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < total).then_some(n + 1)
            })
            .is_err()
        {
            tracing::trace!(key = %session.key, "listing exhausted");
        }
        Ok(())
    }

    async fn probe_size(&self, session: &ReplaySession) -> Result<u64, ProviderError> {
        Ok(session.visible().len() as u64)
    }

    async fn entity_name(&self, session: &ReplaySession) -> Result<Option<String>, ProviderError> {
        Ok(session.script.entity_name.clone())
    }

    async fn close(&self, session: ReplaySession) {
        tracing::trace!(
            key = %session.key,
            revealed = session.revealed.load(Ordering::SeqCst),
            "replay session closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "targets": {
            "123": {
                "entity_name": "Acme Co",
                "pages": [[{"ad_id": "1"}, {"ad_id": "2"}], [], [{"ad_id": "3"}]]
            },
            "running shoes": { "pages": [[{"ad_id": "9"}]] }
        }
    }"#;

    fn provider() -> ReplayProvider {
        ReplayProvider::new(ReplayFixture::parse(FIXTURE).unwrap())
    }

    fn ids(items: &[RawCreative]) -> Vec<&str> {
        items.iter().filter_map(|i| i.ad_id.as_deref()).collect()
    }

    #[tokio::test]
    async fn reveals_one_page_per_advance() {
        let p = provider();
        let s = p
            .render("https://x.test/?view_all_page_id=123")
            .await
            .unwrap();
        assert_eq!(ids(&p.extract_visible_items(&s).await.unwrap()), ["1", "2"]);
        assert_eq!(p.probe_size(&s).await.unwrap(), 2);

        p.advance(&s).await.unwrap();
        // Empty page: nothing new, probe unchanged.
        assert_eq!(p.probe_size(&s).await.unwrap(), 2);

        p.advance(&s).await.unwrap();
        assert_eq!(
            ids(&p.extract_visible_items(&s).await.unwrap()),
            ["1", "2", "3"]
        );

        p.advance(&s).await.unwrap();
        assert_eq!(p.probe_size(&s).await.unwrap(), 3);
        assert_eq!(p.entity_name(&s).await.unwrap().as_deref(), Some("Acme Co"));
    }

    #[tokio::test]
    async fn advancing_past_the_last_page_keeps_the_listing() {
        let p = provider();
        let s = p.render("https://x.test/?q=running+shoes").await.unwrap();

        for _ in 0..3 {
            p.advance(&s).await.unwrap();
        }

        assert_eq!(ids(&p.extract_visible_items(&s).await.unwrap()), ["9"]);
        assert_eq!(p.probe_size(&s).await.unwrap(), 1);
        assert_eq!(s.revealed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolves_search_terms_from_query() {
        let p = provider();
        let s = p.render("https://x.test/?q=running+shoes").await.unwrap();
        assert_eq!(ids(&p.extract_visible_items(&s).await.unwrap()), ["9"]);
        assert_eq!(p.entity_name(&s).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_target_is_a_provider_error() {
        let p = provider();
        let err = p
            .render("https://x.test/?view_all_page_id=999")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::Other(_)));
    }

    #[test]
    fn bad_fixture_is_a_parse_error() {
        assert!(matches!(
            ReplayFixture::parse("{\"targets\": 3}"),
            Err(ScraperError::FixtureParse(_))
        ));
    }

    #[test]
    fn missing_fixture_file_is_an_io_error() {
        let err = ReplayFixture::from_path(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(matches!(err, ScraperError::FixtureIo { .. }));
    }
}
