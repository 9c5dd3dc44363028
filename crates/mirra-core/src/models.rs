use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, FailureKind, LookupError};

/// Base address of one mirror.
///
/// Only `http` and `https` bases are accepted. A trailing `/` is dropped so
/// `https://nitter.net/` and `https://nitter.net` name the same mirror.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint(String);

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed)
            .map_err(|e| AppError::ConfigError(format!("Invalid endpoint '{raw}': {e}")))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::ConfigError(format!(
                    "Endpoint scheme '{scheme}' is not allowed (only http/https): {raw}"
                )));
            }
        }

        if parsed.host_str().is_none() {
            return Err(AppError::ConfigError(format!("Endpoint has no host: {raw}")));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the profile address `base/username`.
    ///
    /// The username is pushed as a single percent-encoded path segment.
    pub fn profile_url(&self, username: &str) -> Result<String, AppError> {
        let mut url = Url::parse(&self.0)
            .map_err(|e| AppError::ConfigError(format!("Invalid endpoint '{}': {e}", self.0)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError(format!("Endpoint cannot be a base: {}", self.0)))?
            .pop_if_empty()
            .push(username);
        Ok(url.into())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Endpoint {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

/// Record of a single fetch attempt against one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchAttempt {
    pub endpoint: Endpoint,
    /// Zero-based attempt index within the endpoint.
    pub attempt: u32,
    /// Total backoff slept on this endpoint before the attempt started.
    #[serde(with = "millis")]
    pub backoff: Duration,
    /// `None` when the attempt produced a validated document.
    pub error: Option<String>,
}

impl FetchAttempt {
    pub fn success(endpoint: &Endpoint, attempt: u32, backoff: Duration) -> Self {
        Self {
            endpoint: endpoint.clone(),
            attempt,
            backoff,
            error: None,
        }
    }

    pub fn failure(
        endpoint: &Endpoint,
        attempt: u32,
        backoff: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.clone(),
            attempt,
            backoff,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Unparsed markup of a fetched body that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument(String);

impl RawDocument {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Candidate fields pulled out of a document, before business rules apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub name: String,
    pub bio: String,
    pub followers_text: String,
    pub following_text: String,
    /// Non-empty, non-repost post texts in document order.
    pub posts: Vec<String>,
}

/// Normalized profile record returned by a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub username: String,
    pub name: String,
    pub bio: String,
    #[serde(rename = "tweets")]
    pub posts: Vec<String>,
    pub followers: u64,
    pub following: u64,
}

/// The only value crossing the core boundary.
///
/// Serializes to `{"success": true, "profile": {..}}` or
/// `{"success": false, "error": "..", "kind": ".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "OutcomeBody")]
pub enum ScrapeOutcome {
    Success { profile: ProfileResult },
    Failure { kind: FailureKind, reason: String },
}

impl ScrapeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Success { .. })
    }

    pub fn profile(&self) -> Option<&ProfileResult> {
        match self {
            ScrapeOutcome::Success { profile } => Some(profile),
            ScrapeOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ScrapeOutcome::Success { .. } => None,
            ScrapeOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<Result<ProfileResult, LookupError>> for ScrapeOutcome {
    fn from(result: Result<ProfileResult, LookupError>) -> Self {
        match result {
            Ok(profile) => ScrapeOutcome::Success { profile },
            Err(err) => err.into(),
        }
    }
}

impl From<LookupError> for ScrapeOutcome {
    fn from(err: LookupError) -> Self {
        ScrapeOutcome::Failure {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OutcomeBody {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<ProfileResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<FailureKind>,
}

impl From<ScrapeOutcome> for OutcomeBody {
    fn from(outcome: ScrapeOutcome) -> Self {
        match outcome {
            ScrapeOutcome::Success { profile } => Self {
                success: true,
                profile: Some(profile),
                error: None,
                kind: None,
            },
            ScrapeOutcome::Failure { kind, reason } => Self {
                success: false,
                profile: None,
                error: Some(reason),
                kind: Some(kind),
            },
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
