use std::sync::Arc;

use crate::assemble::{assemble_profile, normalize_username};
use crate::config::ScrapeConfig;
use crate::error::{AppError, LookupError};
use crate::extract::{FieldExtractor, SelectorTable};
use crate::failover::{FailoverOrchestrator, FetchedDocument};
use crate::models::{Endpoint, FetchAttempt, ScrapeOutcome};
use crate::retry::RetryExecutor;
use crate::traits::Fetcher;
use crate::validate::ResponseValidator;

/// Everything a single lookup did, for diagnostics.
#[derive(Debug, Clone)]
pub struct LookupReport {
    pub outcome: ScrapeOutcome,
    /// Every fetch attempt, in the order they were made.
    pub attempts: Vec<FetchAttempt>,
    /// The endpoint that served the validated page, if any did.
    pub endpoint: Option<Endpoint>,
}

/// Orchestrates a profile lookup: normalize → failover fetch → extract → assemble.
///
/// Generic over the network layer via [`Fetcher`], so tests run against a
/// scripted mock. The configuration is immutable and shared; each lookup
/// owns its own attempt state, so one service can serve concurrent lookups.
#[derive(Clone)]
pub struct ProfileService<F: Fetcher> {
    fetcher: F,
    config: Arc<ScrapeConfig>,
    validator: ResponseValidator,
    extractor: FieldExtractor,
}

impl<F: Fetcher> ProfileService<F> {
    /// Build a service, compiling the selector table up front.
    pub fn new(fetcher: F, config: ScrapeConfig) -> Result<Self, AppError> {
        config.validate()?;
        let table = SelectorTable::compile(&config.selectors)?;
        let extractor = FieldExtractor::new(table, config.repost_prefix.clone());
        let validator = ResponseValidator::new(config.markers.clone());

        Ok(Self {
            fetcher,
            config: Arc::new(config),
            validator,
            extractor,
        })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Look up one profile. Never fails: every error becomes
    /// [`ScrapeOutcome::Failure`].
    pub async fn lookup(&self, username: &str) -> ScrapeOutcome {
        self.lookup_with_report(username).await.outcome
    }

    /// Like [`lookup`](Self::lookup), also returning the attempt log.
    pub async fn lookup_with_report(&self, username: &str) -> LookupReport {
        let username = match normalize_username(username) {
            Ok(username) => username,
            Err(err) => {
                tracing::warn!(error = %err, "Rejected username");
                return LookupReport {
                    outcome: err.into(),
                    attempts: Vec::new(),
                    endpoint: None,
                };
            }
        };

        tracing::info!(
            %username,
            endpoints = self.config.endpoints.len(),
            "Looking up profile"
        );

        let mut attempts = Vec::new();
        let (outcome, endpoint) = match self.fetch_page(&username, &mut attempts).await {
            Ok(FetchedDocument { endpoint, document }) => {
                tracing::info!(%endpoint, bytes = document.len(), "Fetched profile page");
                let fields = self.extractor.extract(&document);
                let result = assemble_profile(username, fields, self.config.max_posts);
                (ScrapeOutcome::from(result), Some(endpoint))
            }
            Err(err) => (ScrapeOutcome::from(err), None),
        };

        match &outcome {
            ScrapeOutcome::Success { profile } => {
                tracing::info!(
                    username = %profile.username,
                    posts = profile.posts.len(),
                    followers = profile.followers,
                    attempts = attempts.len(),
                    "Lookup succeeded"
                );
            }
            ScrapeOutcome::Failure { kind, reason } => {
                tracing::warn!(%kind, %reason, attempts = attempts.len(), "Lookup failed");
            }
        }

        LookupReport {
            outcome,
            attempts,
            endpoint,
        }
    }

    async fn fetch_page(
        &self,
        username: &str,
        attempts: &mut Vec<FetchAttempt>,
    ) -> Result<FetchedDocument, LookupError> {
        let executor = RetryExecutor::new(&self.fetcher, &self.config.retry, &self.validator);
        let orchestrator = FailoverOrchestrator::new(&self.config.endpoints, executor);
        let pending = orchestrator.fetch_profile_page(username, attempts);

        let Some(deadline) = self.config.overall_timeout() else {
            return pending.await;
        };
        let result = tokio::time::timeout(deadline, pending).await;
        match result {
            Ok(result) => result,
            Err(_) => Err(LookupError::DeadlineExceeded {
                deadline,
                details: failure_details(attempts),
            }),
        }
    }
}

/// Last error of each endpoint in a partial attempt log, in the order tried.
fn failure_details(attempts: &[FetchAttempt]) -> Vec<String> {
    let mut details: Vec<String> = Vec::new();
    for attempt in attempts {
        let Some(error) = &attempt.error else {
            continue;
        };
        let line = format!("{}: {error}", attempt.endpoint);
        match details.last_mut() {
            Some(last) if attempt.attempt > 0 => *last = line,
            _ => details.push(line),
        }
    }
    details
}
