use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const MAX_ADS_PER_TARGET_LIMIT: usize = 1000;

/// Ad library `active_status` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl StatusFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
            StatusFilter::All => "all",
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for one harvesting run.
///
/// Loaded from YAML with serde defaults, then checked by [`RunConfig::validate`]
/// before anything touches a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Advertiser page ids, collected first and in order.
    pub advertiser_ids: Vec<String>,
    /// Free-text queries, collected after all advertisers.
    pub search_terms: Vec<String>,
    pub country_code: String,
    pub ad_status: StatusFilter,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Cap applied to each target independently.
    pub max_ads_per_target: usize,
    pub include_media_urls: bool,
    pub classify_ads: bool,
    /// Upper bound on simultaneous provider sessions.
    pub max_concurrent_sessions: usize,
    /// Budget for one target's whole session.
    pub target_timeout_secs: u64,
    /// Pause after each scroll so new content can render.
    pub settle_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            advertiser_ids: Vec::new(),
            search_terms: Vec::new(),
            country_code: "US".to_string(),
            ad_status: StatusFilter::Active,
            start_date: None,
            end_date: None,
            max_ads_per_target: 100,
            include_media_urls: true,
            classify_ads: true,
            max_concurrent_sessions: 1,
            target_timeout_secs: 120,
            settle_delay_ms: 2000,
        }
    }
}

impl RunConfig {
    /// Total number of targets (advertisers plus search terms).
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.advertiser_ids.len() + self.search_terms.len()
    }

    /// Checks the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_count() == 0 {
            return Err(ConfigError::Validation(
                "no advertiser ids or search terms provided; supply at least one".to_string(),
            ));
        }

        check_targets("advertiser id", &self.advertiser_ids)?;
        check_targets("search term", &self.search_terms)?;

        if self.country_code.len() != 2 || !self.country_code.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ConfigError::Validation(format!(
                "country code '{}' must be two ASCII letters",
                self.country_code
            )));
        }

        if !(1..=MAX_ADS_PER_TARGET_LIMIT).contains(&self.max_ads_per_target) {
            return Err(ConfigError::Validation(format!(
                "max_ads_per_target {} must be between 1 and {MAX_ADS_PER_TARGET_LIMIT}",
                self.max_ads_per_target
            )));
        }

        if self.max_concurrent_sessions == 0 {
            return Err(ConfigError::Validation(
                "max_concurrent_sessions must be at least 1".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigError::Validation(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }

        Ok(())
    }
}

fn check_targets(kind: &str, targets: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for target in targets {
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Validation(format!("{kind} must be non-empty")));
        }
        if !seen.insert(trimmed.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate {kind}: '{trimmed}'"
            )));
        }
    }
    Ok(())
}

/// Parse and validate a run configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_run_config(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate the run configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_run_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RunFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_run_config(&content)
}
