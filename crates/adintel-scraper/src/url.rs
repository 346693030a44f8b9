//! Ad library listing URLs.

use adintel_core::RunConfig;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::types::Target;

pub const AD_LIBRARY_URL: &str = "https://www.facebook.com/ads/library/";

/// Form encoding: everything but `A-Z a-z 0-9 - . _ ~` is escaped, and
/// spaces become `+`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Builds the listing URL for one target under the run's filters.
///
/// Parameters are always emitted in the same order so URLs are stable
/// across runs.
#[must_use]
pub fn build_search_url(config: &RunConfig, target: &Target) -> String {
    let mut params: Vec<(&str, String)> = vec![
        ("active_status", config.ad_status.as_str().to_owned()),
        ("ad_type", "all".to_owned()),
        ("country", config.country_code.clone()),
        ("media_type", "all".to_owned()),
    ];
    match target {
        Target::Advertiser(id) => params.push(("view_all_page_id", id.clone())),
        Target::Search(term) => params.push(("q", term.clone())),
    }
    if let Some(min) = config.start_date {
        params.push(("start_date[min]", min.format("%Y-%m-%d").to_string()));
    }
    if let Some(max) = config.end_date {
        params.push(("start_date[max]", max.format("%Y-%m-%d").to_string()));
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{AD_LIBRARY_URL}?{query}")
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE)
        .to_string()
        .replace("%20", "+")
}

/// Looks up one query parameter, decoding `+` and percent escapes.
#[must_use]
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if decode(k) == name {
            Some(decode(v))
        } else {
            None
        }
    })
}

fn decode(value: &str) -> String {
    percent_decode_str(&value.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
