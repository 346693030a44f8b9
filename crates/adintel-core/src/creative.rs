use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kind of media attached to a creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Carousel,
    #[default]
    Unknown,
}

impl MediaKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Carousel => "carousel",
            MediaKind::Unknown => "unknown",
        }
    }
}

/// Persuasive strategy behind an ad's messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdAngle {
    ProblemSolution,
    Testimonial,
    Comparison,
    Urgency,
    Educational,
    Lifestyle,
    Discount,
    NewProduct,
    Unknown,
}

impl AdAngle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AdAngle::ProblemSolution => "problem_solution",
            AdAngle::Testimonial => "testimonial",
            AdAngle::Comparison => "comparison",
            AdAngle::Urgency => "urgency",
            AdAngle::Educational => "educational",
            AdAngle::Lifestyle => "lifestyle",
            AdAngle::Discount => "discount",
            AdAngle::NewProduct => "new_product",
            AdAngle::Unknown => "unknown",
        }
    }
}

/// Style of an ad's opening line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStyle {
    Question,
    Statistic,
    BoldClaim,
    Story,
    SocialProof,
    PainPoint,
    Benefit,
    Unknown,
}

impl HookStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HookStyle::Question => "question",
            HookStyle::Statistic => "statistic",
            HookStyle::BoldClaim => "bold_claim",
            HookStyle::Story => "story",
            HookStyle::SocialProof => "social_proof",
            HookStyle::PainPoint => "pain_point",
            HookStyle::Benefit => "benefit",
            HookStyle::Unknown => "unknown",
        }
    }
}

/// Promotional mechanism found in an ad.
///
/// `NoOffer` means the rules ran against non-empty text and nothing matched.
/// `Unknown` means there was no text to classify at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    PercentageOff,
    FixedDiscount,
    FreeShipping,
    Bogo,
    FreeTrial,
    LimitedTime,
    NoOffer,
    Unknown,
}

impl OfferType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OfferType::PercentageOff => "percentage_off",
            OfferType::FixedDiscount => "fixed_discount",
            OfferType::FreeShipping => "free_shipping",
            OfferType::Bogo => "bogo",
            OfferType::FreeTrial => "free_trial",
            OfferType::LimitedTime => "limited_time",
            OfferType::NoOffer => "no_offer",
            OfferType::Unknown => "unknown",
        }
    }
}

macro_rules! impl_label_display {
    ($($ty:ty),+) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

impl_label_display!(MediaKind, AdAngle, HookStyle, OfferType);

/// One observed ad creative, normalized from a provider item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeRecord {
    /// Ad library identifier. Non-empty and unique within one run.
    pub ad_id: String,
    /// Page id of the advertiser. Empty for creatives found via search terms.
    pub entity_id: String,
    pub entity_name: String,
    /// Primary ad copy.
    pub body_text: Option<String>,
    pub headline: Option<String>,
    pub description: Option<String>,
    /// Call-to-action button text, e.g. `"Shop Now"`.
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    /// Explicit landing page, or the CTA link when the item had none.
    pub landing_page_url: Option<String>,
    pub media_kind: MediaKind,
    /// Always empty when the run opted out of media capture.
    pub media_urls: Vec<String>,
    /// `false` whenever `ended_on` is present.
    pub is_active: bool,
    pub started_on: Option<NaiveDate>,
    pub ended_on: Option<NaiveDate>,
    /// Distribution channels, e.g. `["Facebook", "Instagram"]`.
    pub platforms: Vec<String>,
    pub impressions_lower: Option<u64>,
    pub impressions_upper: Option<u64>,
    pub spend_lower: Option<f64>,
    pub spend_upper: Option<f64>,
    /// ISO country code the run was scoped to.
    pub country_code: String,
    pub collected_at: DateTime<Utc>,
    pub angle: Option<AdAngle>,
    pub hook: Option<HookStyle>,
    pub offer: Option<OfferType>,
    /// Whole days between start and end (or the classification date).
    pub days_active: Option<i64>,
}

impl CreativeRecord {
    /// Builds an active, unclassified record with every optional field unset.
    #[must_use]
    pub fn new(
        ad_id: impl Into<String>,
        entity_id: impl Into<String>,
        entity_name: impl Into<String>,
        country_code: impl Into<String>,
        collected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ad_id: ad_id.into(),
            entity_id: entity_id.into(),
            entity_name: entity_name.into(),
            body_text: None,
            headline: None,
            description: None,
            cta_text: None,
            cta_link: None,
            landing_page_url: None,
            media_kind: MediaKind::Unknown,
            media_urls: Vec::new(),
            is_active: true,
            started_on: None,
            ended_on: None,
            platforms: Vec::new(),
            impressions_lower: None,
            impressions_upper: None,
            spend_lower: None,
            spend_upper: None,
            country_code: country_code.into(),
            collected_at,
            angle: None,
            hook: None,
            offer: None,
            days_active: None,
        }
    }

    /// Copy, headline and description joined by single spaces, skipping
    /// absent or empty fields.
    #[must_use]
    pub fn combined_text(&self) -> String {
        [&self.body_text, &self.headline, &self.description]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
