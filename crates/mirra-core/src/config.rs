//! Lookup configuration: endpoint pool, retry policy, validation markers,
//! and the fallback selector table.
//!
//! Everything has a built-in default, so `ScrapeConfig::default()` is a
//! working configuration. Overrides come from a JSON file and then from
//! `MIRRA_*` environment variables, in that order.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extract::SelectorTable;
use crate::models::Endpoint;

const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://nitter.net",
    "https://nitter.1d4.us",
    "https://nitter.kavin.rocks",
    "https://nitter.it",
    "https://nitter.privacydev.net",
    "https://nitter.projectsegfau.lt",
];

const DEFAULT_MARKERS: &[&str] = &["profile-card", "timeline", "tweet-content"];

/// Upper bound on posts in a profile result; `max_posts` may only lower it.
pub const MAX_POSTS: usize = 5;

/// Retry policy applied to every endpoint independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts per endpoint. `0` behaves like `1`.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub attempt_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            attempt_timeout_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Backoff after the failed attempt `index` (zero-based): `base * 2^index`.
    ///
    /// - Index 0: base
    /// - Index 1: 2 × base
    /// - Index 2: 4 × base
    pub fn delay_for_attempt(&self, index: u32) -> Duration {
        let factor = 2u64.saturating_pow(index);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// One selector candidate: a CSS selector and which match to take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CandidateRepr")]
pub struct SelectorCandidate {
    pub css: String,
    /// Zero-based index among the selector's matches. Ignored for posts.
    #[serde(skip_serializing_if = "is_zero")]
    pub index: usize,
}

impl SelectorCandidate {
    pub fn new(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            index: 0,
        }
    }

    pub fn nth(css: impl Into<String>, index: usize) -> Self {
        Self {
            css: css.into(),
            index,
        }
    }
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

/// Candidates may be written as a bare CSS string or as `{css, index}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateRepr {
    Css(String),
    Full {
        css: String,
        #[serde(default)]
        index: usize,
    },
}

impl From<CandidateRepr> for SelectorCandidate {
    fn from(repr: CandidateRepr) -> Self {
        match repr {
            CandidateRepr::Css(css) => SelectorCandidate::new(css),
            CandidateRepr::Full { css, index } => SelectorCandidate::nth(css, index),
        }
    }
}

/// Priority-ordered selector candidates per field.
///
/// Each list covers the markup variants served by different mirror
/// software versions. The first candidate that matches wins, except for
/// `posts`, where every candidate contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub name: Vec<SelectorCandidate>,
    pub bio: Vec<SelectorCandidate>,
    pub followers: Vec<SelectorCandidate>,
    pub following: Vec<SelectorCandidate>,
    pub posts: Vec<SelectorCandidate>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            name: vec![
                SelectorCandidate::new(".profile-card-fullname"),
                SelectorCandidate::new(".profile-card .fullname"),
                SelectorCandidate::new(".profile-name-full"),
            ],
            bio: vec![
                SelectorCandidate::new(".profile-bio"),
                SelectorCandidate::new(".profile-card .bio"),
                SelectorCandidate::new(".profile-description"),
            ],
            followers: vec![
                SelectorCandidate::new(".profile-statlist .followers .profile-stat-num"),
                SelectorCandidate::new(".followers .profile-stat-num"),
                SelectorCandidate::nth(".profile-stat-num", 0),
            ],
            following: vec![
                SelectorCandidate::new(".profile-statlist .following .profile-stat-num"),
                SelectorCandidate::new(".following .profile-stat-num"),
                SelectorCandidate::nth(".profile-stat-num", 1),
            ],
            posts: vec![
                SelectorCandidate::new(".tweet-content"),
                SelectorCandidate::new(".timeline-item .tweet-text"),
                SelectorCandidate::new(".status-content"),
            ],
        }
    }
}

/// Immutable configuration for a [`ProfileService`](crate::ProfileService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Mirrors in trial order.
    pub endpoints: Vec<Endpoint>,
    pub retry: RetryPolicy,
    /// A fetched body must contain at least one of these substrings.
    pub markers: Vec<String>,
    pub selectors: SelectorConfig,
    pub max_posts: usize,
    pub repost_prefix: String,
    /// Optional bound on a whole lookup, across all endpoints and retries.
    pub overall_timeout_ms: Option<u64>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS
                .iter()
                .filter_map(|e| Endpoint::parse(e).ok())
                .collect(),
            retry: RetryPolicy::default(),
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            selectors: SelectorConfig::default(),
            max_posts: MAX_POSTS,
            repost_prefix: "RT @".to_string(),
            overall_timeout_ms: None,
        }
    }
}

impl ScrapeConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MIRRA_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, AppError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// - `MIRRA_ENDPOINTS`: comma-separated endpoint pool
    /// - `MIRRA_MAX_RETRIES`
    /// - `MIRRA_BASE_DELAY_MS`
    /// - `MIRRA_ATTEMPT_TIMEOUT_SECS`
    /// - `MIRRA_OVERALL_TIMEOUT_SECS` (`0` disables the deadline)
    pub fn apply_env_with<L>(mut self, lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("MIRRA_ENDPOINTS") {
            self.endpoints = parse_endpoint_list(&raw)?;
        }
        if let Some(raw) = lookup("MIRRA_MAX_RETRIES") {
            self.retry.max_retries = parse_env_number("MIRRA_MAX_RETRIES", &raw)?;
        }
        if let Some(raw) = lookup("MIRRA_BASE_DELAY_MS") {
            self.retry.base_delay_ms = parse_env_number("MIRRA_BASE_DELAY_MS", &raw)?;
        }
        if let Some(raw) = lookup("MIRRA_ATTEMPT_TIMEOUT_SECS") {
            let secs: u64 = parse_env_number("MIRRA_ATTEMPT_TIMEOUT_SECS", &raw)?;
            self.retry.attempt_timeout_ms = secs.saturating_mul(1_000);
        }
        if let Some(raw) = lookup("MIRRA_OVERALL_TIMEOUT_SECS") {
            let secs: u64 = parse_env_number("MIRRA_OVERALL_TIMEOUT_SECS", &raw)?;
            self.overall_timeout_ms = (secs > 0).then(|| secs.saturating_mul(1_000));
        }
        Ok(self)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=MAX_POSTS).contains(&self.max_posts) {
            return Err(AppError::ConfigError(format!(
                "max_posts must be between 1 and {MAX_POSTS}, got {}",
                self.max_posts
            )));
        }
        if self.retry.attempt_timeout_ms == 0 {
            return Err(AppError::ConfigError(
                "retry.attempt_timeout_ms must be at least 1".into(),
            ));
        }
        SelectorTable::compile(&self.selectors)?;
        Ok(())
    }

    pub fn overall_timeout(&self) -> Option<Duration> {
        self.overall_timeout_ms.map(Duration::from_millis)
    }
}

/// Parse a comma-separated endpoint list, skipping blank entries.
pub fn parse_endpoint_list(raw: &str) -> Result<Vec<Endpoint>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Endpoint::parse)
        .collect()
}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid {key} '{raw}': must be a non-negative integer"
        ))
    })
}
