pub mod assemble;
pub mod config;
pub mod error;
pub mod extract;
pub mod failover;
pub mod models;
pub mod normalize;
pub mod retry;
pub mod service;
pub mod traits;
pub mod validate;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{RetryPolicy, ScrapeConfig, SelectorCandidate, SelectorConfig};
pub use error::{AppError, FailureKind, LookupError};
pub use models::{Endpoint, FetchAttempt, ProfileResult, ScrapeOutcome};
pub use normalize::normalize_count;
pub use service::{LookupReport, ProfileService};
pub use traits::Fetcher;
