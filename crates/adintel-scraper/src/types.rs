//! Raw item shape exposed by a page provider.
//!
//! ## Observed shape of an ad library card
//!
//! ### Identifier
//! Taken from the card's `data-ad-id` attribute or element id. Cards can
//! render before the attribute is set, so it may be missing or blank; such
//! items are dropped by the collector.
//!
//! ### Dates
//! The card shows `"Started running on Dec 25, 2024"`. Providers may pass
//! the whole phrase or just the date part; both are accepted. Other
//! observed formats: `2024-12-25`, `12/25/2024`, `December 25, 2024`.
//!
//! ### Impressions / spend
//! Only present for political and issue ads, as display ranges such as
//! `"1K-5K"`, `"10K – 50K"` or `"$100-$499"`.
//!
//! ### Media flags
//! `is_carousel` wins over `has_video`, which wins over `has_image`.

use serde::{Deserialize, Serialize};

/// One visible ad card as returned by [`crate::PageProvider::extract_visible_items`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCreative {
    pub ad_id: Option<String>,
    pub body_text: Option<String>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub landing_page: Option<String>,
    pub media_urls: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub platforms: Vec<String>,
    pub has_video: bool,
    pub has_image: bool,
    pub is_carousel: bool,
    pub impressions: Option<String>,
    pub spend: Option<String>,
}

impl RawCreative {
    /// Trimmed identifier, or `None` when absent or blank.
    #[must_use]
    pub fn usable_id(&self) -> Option<&str> {
        self.ad_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// One unit of collection work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An advertiser page id.
    Advertiser(String),
    /// A free-text query.
    Search(String),
}

impl Target {
    /// Entity id attached to creatives from this target. Search results are
    /// not tied to one advertiser, so they get an empty id.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Target::Advertiser(id) => id,
            Target::Search(_) => "",
        }
    }

    /// Name used when the provider cannot resolve the advertiser's page name.
    #[must_use]
    pub fn fallback_name(&self) -> String {
        match self {
            Target::Advertiser(id) => format!("Advertiser {id}"),
            Target::Search(term) => format!("Search: {term}"),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Advertiser(id) => write!(f, "advertiser:{id}"),
            Target::Search(term) => write!(f, "search:{term}"),
        }
    }
}
