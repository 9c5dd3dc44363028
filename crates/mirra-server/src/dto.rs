use serde::{Deserialize, Serialize};

use mirra_core::{ProfileResult, ScrapeOutcome};

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ScrapeRequest {
    /// Profile username, with or without a leading '@'
    pub username: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub username: String,
    pub name: String,
    pub bio: String,
    /// Non-repost posts, in the order the mirror page lists them
    pub tweets: Vec<String>,
    pub followers: u64,
    pub following: u64,
}

impl From<ProfileResult> for ProfileResponse {
    fn from(profile: ProfileResult) -> Self {
        Self {
            username: profile.username,
            name: profile.name,
            bio: profile.bio,
            tweets: profile.posts,
            followers: profile.followers,
            following: profile.following,
        }
    }
}

/// Wire shape of a lookup outcome.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ScrapeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileResponse>,
    /// Human-readable failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable failure class (e.g. "not_found")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl ScrapeResponse {
    pub fn missing_username() -> Self {
        Self {
            success: false,
            profile: None,
            error: Some("Username is required".to_string()),
            kind: Some("invalid_input"),
        }
    }
}

impl From<ScrapeOutcome> for ScrapeResponse {
    fn from(outcome: ScrapeOutcome) -> Self {
        match outcome {
            ScrapeOutcome::Success { profile } => Self {
                success: true,
                profile: Some(profile.into()),
                error: None,
                kind: None,
            },
            ScrapeOutcome::Failure { kind, reason } => Self {
                success: false,
                profile: None,
                error: Some(reason),
                kind: Some(kind.as_str()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
