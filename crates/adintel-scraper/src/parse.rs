//! Lenient parsing of dates and numeric ranges shown on ad cards.
//!
//! Nothing here returns an error: unrecognized input resolves to `None`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Tried in order; the first that parses wins.
const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

const STARTED_PREFIX: &str = "started running on";

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$?\s*(\d[\d,]*(?:\.\d+)?[kmb]?)\s*[-–]\s*\$?\s*(\d[\d,]*(?:\.\d+)?[kmb]?)")
        .expect("valid range regex")
});

/// Parses a card date such as `"Dec 25, 2024"` or
/// `"Started running on Dec 25, 2024"`.
#[must_use]
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let mut text = raw?.trim();
    if text.len() >= STARTED_PREFIX.len()
        && text.is_char_boundary(STARTED_PREFIX.len())
        && text[..STARTED_PREFIX.len()].eq_ignore_ascii_case(STARTED_PREFIX)
    {
        text = text[STARTED_PREFIX.len()..].trim();
    }
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Parses a `low-high` range such as `"1K-5K"`, `"10K – 50K"` or
/// `"$100-$499"`. Returns `(low, high)` with `low <= high`.
#[must_use]
pub fn parse_range(raw: Option<&str>) -> Option<(f64, f64)> {
    let caps = RANGE_RE.captures(raw?)?;
    let low = parse_scaled(caps.get(1)?.as_str())?;
    let high = parse_scaled(caps.get(2)?.as_str())?;
    Some(if low <= high { (low, high) } else { (high, low) })
}

/// Parses `"5K"`, `"1.5M"`, `"2B"`, `"1,000"` into a plain number.
fn parse_scaled(token: &str) -> Option<f64> {
    let cleaned: String = token
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let (digits, multiplier) = match cleaned.chars().last()? {
        'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'B' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    digits.parse::<f64>().ok().map(|v| v * multiplier)
}
