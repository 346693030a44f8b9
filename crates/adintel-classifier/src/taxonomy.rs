//! Pattern tables for the three label categories.
//!
//! Each table is an ordered slice of `(label, patterns)`. Order is part of
//! the contract: angle ties resolve to the earlier label, and hook/offer
//! classification returns the first label whose rule matches. Patterns are
//! matched against lowercased text.

use std::sync::LazyLock;

use adintel_core::{AdAngle, HookStyle, OfferType};
use regex::Regex;

pub const ANGLE_RULES: &[(AdAngle, &[&str])] = &[
    (
        AdAngle::ProblemSolution,
        &[
            r"tired of",
            r"struggling with",
            r"finally\s+a\s+solution",
            r"say goodbye to",
            r"no more",
            r"stop\s+\w+ing",
        ],
    ),
    (
        AdAngle::Testimonial,
        &[
            r"customer\s+reviews?",
            r"what\s+\w+\s+are\s+saying",
            r"loved\s+by",
            r"rated\s+\d+",
            r"★+",
            r"\d+\s+reviews?",
        ],
    ),
    (
        AdAngle::Comparison,
        &[
            r"vs\.?",
            r"compared\s+to",
            r"unlike\s+other",
            r"better\s+than",
            r"why\s+choose",
        ],
    ),
    (
        AdAngle::Urgency,
        &[
            r"limited\s+time",
            r"ends?\s+soon",
            r"last\s+chance",
            r"only\s+\d+\s+left",
            r"hurry",
            r"don'?t\s+miss",
            r"act\s+now",
        ],
    ),
    (
        AdAngle::Educational,
        &[
            r"how\s+to",
            r"learn\s+",
            r"discover\s+",
            r"guide",
            r"tips?\s+",
            r"secrets?\s+",
        ],
    ),
    (
        AdAngle::Lifestyle,
        &[
            r"lifestyle",
            r"live\s+your",
            r"dream\s+",
            r"experience\s+",
            r"journey",
        ],
    ),
    (
        AdAngle::Discount,
        &[
            r"\d+%\s*off",
            r"save\s+\$?\d+",
            r"discount",
            r"sale\b",
            r"deal\b",
        ],
    ),
    (
        AdAngle::NewProduct,
        &[
            r"new\s+",
            r"introducing",
            r"just\s+launched",
            r"now\s+available",
            r"announcing",
        ],
    ),
];

/// Hook rules are anchored: they only ever see the first sentence.
pub const HOOK_RULES: &[(HookStyle, &[&str])] = &[
    (
        HookStyle::Question,
        &[
            r"^[^.!]*\?",
            r"^(do|are|is|have|can|will|what|why|how|when|where)\s",
        ],
    ),
    (
        HookStyle::Statistic,
        &[r"^\d+%", r"^\d+\s+(out\s+of|in)", r"^studies?\s+show"],
    ),
    (
        HookStyle::BoldClaim,
        &[
            r"^the\s+(best|only|#1|number\s+one)",
            r"^guaranteed",
            r"^proven",
        ],
    ),
    (
        HookStyle::Story,
        &[r"^(i|we|my)\s+", r"^when\s+i", r"^last\s+(week|month|year)"],
    ),
    (
        HookStyle::SocialProof,
        &[r"^\d+[k+]?\s+(people|customers|users)", r"^join\s+\d+"],
    ),
    (
        HookStyle::PainPoint,
        &[r"^tired\s+of", r"^frustrated", r"^sick\s+of", r"^struggling"],
    ),
    (
        HookStyle::Benefit,
        &[r"^get\s+", r"^achieve\s+", r"^unlock\s+", r"^transform\s+"],
    ),
];

pub const OFFER_RULES: &[(OfferType, &[&str])] = &[
    (OfferType::PercentageOff, &[r"\d+%\s*(off|discount)"]),
    (OfferType::FixedDiscount, &[r"\$\d+\s*off", r"save\s+\$\d+"]),
    (OfferType::FreeShipping, &[r"free\s+shipping", r"free\s+delivery"]),
    (
        OfferType::Bogo,
        &[r"buy\s+\d+\s+get\s+\d+", r"bogo", r"buy\s+one\s+get\s+one"],
    ),
    (
        OfferType::FreeTrial,
        &[r"free\s+trial", r"try\s+(it\s+)?free", r"\d+[\s-]day\s+trial"],
    ),
    (
        OfferType::LimitedTime,
        &[
            r"limited\s+time",
            r"today\s+only",
            r"ends?\s+(tonight|today|soon)",
        ],
    ),
];

/// A rule table with every pattern compiled, order preserved.
pub type CompiledRules<L> = Vec<(L, Vec<Regex>)>;

fn compile<L: Copy>(rules: &[(L, &[&str])]) -> CompiledRules<L> {
    rules
        .iter()
        .map(|&(label, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(p).expect("valid taxonomy regex"))
                .collect();
            (label, compiled)
        })
        .collect()
}

pub static ANGLES: LazyLock<CompiledRules<AdAngle>> = LazyLock::new(|| compile(ANGLE_RULES));
pub static HOOKS: LazyLock<CompiledRules<HookStyle>> = LazyLock::new(|| compile(HOOK_RULES));
pub static OFFERS: LazyLock<CompiledRules<OfferType>> = LazyLock::new(|| compile(OFFER_RULES));
