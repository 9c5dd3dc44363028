use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attempt-level and configuration errors for Mirra.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A single attempt exceeded its time budget.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// A body (fetched page or request) failed validation.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid configuration (endpoint, selector, env var).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    /// Returns true if this error is transient and worth another attempt.
    ///
    /// Validation failures count as transient: mirrors serve rate-limit pages
    /// and login walls intermittently.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::HttpError(_)
            | AppError::NetworkError(_)
            | AppError::Timeout(_)
            | AppError::ValidationError(_) => true,
            AppError::ConfigError(_) | AppError::SerializationError(_) => false,
        }
    }
}

/// Terminal failure classes of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    AllEndpointsFailed,
    NotFound,
    EmptyContent,
    DeadlineExceeded,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::AllEndpointsFailed => "all_endpoints_failed",
            FailureKind::NotFound => "not_found",
            FailureKind::EmptyContent => "empty_content",
            FailureKind::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal errors of a lookup. These never escape
/// [`ProfileService::lookup`](crate::ProfileService::lookup); they are folded
/// into [`ScrapeOutcome::Failure`](crate::ScrapeOutcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Username was empty after stripping `@` and whitespace.
    #[error("Please enter a valid username")]
    InvalidUsername,

    /// Every endpoint exhausted its retries. One detail per endpoint, pool order.
    #[error(
        "Failed to fetch profile data from all instances. Details: {}",
        .details.join(", ")
    )]
    AllEndpointsFailed { details: Vec<String> },

    /// Page loaded, but no display name could be extracted.
    #[error("Profile not found, is private, or has been suspended")]
    NotFound,

    /// Page loaded with a name, but no original posts survived filtering.
    #[error("No tweets found. The profile might be private or temporarily unavailable.")]
    EmptyContent,

    /// The optional overall deadline elapsed before any endpoint succeeded.
    /// `details` holds the last error of each endpoint tried so far.
    #[error(
        "Lookup exceeded the overall deadline of {}ms{}",
        .deadline.as_millis(),
        details_suffix(.details)
    )]
    DeadlineExceeded {
        deadline: Duration,
        details: Vec<String>,
    },
}

impl LookupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LookupError::InvalidUsername => FailureKind::InvalidInput,
            LookupError::AllEndpointsFailed { .. } => FailureKind::AllEndpointsFailed,
            LookupError::NotFound => FailureKind::NotFound,
            LookupError::EmptyContent => FailureKind::EmptyContent,
            LookupError::DeadlineExceeded { .. } => FailureKind::DeadlineExceeded,
        }
    }
}

fn details_suffix(details: &[String]) -> String {
    if details.is_empty() {
        String::new()
    } else {
        format!(". Details: {}", details.join(", "))
    }
}
