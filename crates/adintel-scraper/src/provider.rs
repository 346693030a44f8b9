//! The page-provider seam.
//!
//! A provider owns whatever renders the ad library (a headless browser, a
//! recorded fixture, a test double) and exposes just enough of it for the
//! collector's scroll loop. The collector never sees markup.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::RawCreative;

/// Renders ad library pages and exposes their currently visible items.
///
/// A session is one rendered listing. Items visible on a session only ever
/// grow as [`PageProvider::advance`] is called; `extract_visible_items`
/// returns all of them every time, in document order.
#[async_trait]
pub trait PageProvider: Send + Sync {
    type Session: Send + Sync;

    /// Opens a listing at `url`.
    async fn render(&self, url: &str) -> Result<Self::Session, ProviderError>;

    /// Every item currently visible, in page order.
    async fn extract_visible_items(
        &self,
        session: &Self::Session,
    ) -> Result<Vec<RawCreative>, ProviderError>;

    /// Asks the listing to load more (a scroll to the bottom, in practice).
    async fn advance(&self, session: &Self::Session) -> Result<(), ProviderError>;

    /// A size measure used to detect that advancing loaded nothing new.
    async fn probe_size(&self, session: &Self::Session) -> Result<u64, ProviderError>;

    /// Display name of the advertiser behind the listing, when the page shows one.
    async fn entity_name(&self, _session: &Self::Session) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }

    /// Releases the session. Called on every exit path except a timeout.
    async fn close(&self, _session: Self::Session) {}
}
