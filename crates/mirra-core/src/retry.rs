use std::time::Duration;

use crate::config::RetryPolicy;
use crate::error::AppError;
use crate::models::{Endpoint, FetchAttempt, RawDocument};
use crate::traits::Fetcher;
use crate::validate::ResponseValidator;

/// Performs one logical fetch against one endpoint.
///
/// Every attempt is bounded by the policy's attempt timeout, and the body is
/// validated inside the retry boundary, so a login wall is retried exactly
/// like a dropped connection. Failed attempts are followed by an exponential
/// backoff (`base`, `2 × base`, `4 × base`, …) unless they were the last.
pub struct RetryExecutor<'a, F> {
    fetcher: &'a F,
    policy: &'a RetryPolicy,
    validator: &'a ResponseValidator,
}

impl<'a, F: Fetcher> RetryExecutor<'a, F> {
    pub fn new(fetcher: &'a F, policy: &'a RetryPolicy, validator: &'a ResponseValidator) -> Self {
        Self {
            fetcher,
            policy,
            validator,
        }
    }

    /// Fetch `url` on behalf of `endpoint`, appending one record per attempt
    /// to `attempts`. Returns the last error once the attempts run out.
    pub async fn fetch(
        &self,
        endpoint: &Endpoint,
        url: &str,
        attempts: &mut Vec<FetchAttempt>,
    ) -> Result<RawDocument, AppError> {
        let max_attempts = self.policy.attempts();
        let mut backoff = Duration::ZERO;
        let mut attempt = 0;

        loop {
            match self.attempt(url).await {
                Ok(document) => {
                    tracing::debug!(
                        %endpoint,
                        attempt,
                        bytes = document.len(),
                        "Fetched validated document"
                    );
                    attempts.push(FetchAttempt::success(endpoint, attempt, backoff));
                    return Ok(document);
                }
                Err(err) => {
                    tracing::warn!(%endpoint, attempt, error = %err, "Fetch attempt failed");
                    attempts.push(FetchAttempt::failure(
                        endpoint,
                        attempt,
                        backoff,
                        err.to_string(),
                    ));

                    if attempt + 1 >= max_attempts || !err.is_retryable() {
                        return Err(err);
                    }

                    let delay = self.policy.delay_for_attempt(attempt);
                    tracing::debug!(
                        %endpoint,
                        attempt,
                        delay_ms = %delay.as_millis(),
                        "Backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    backoff += delay;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<RawDocument, AppError> {
        let timeout = self.policy.attempt_timeout();
        let body = tokio::time::timeout(timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| AppError::Timeout(timeout))??;
        self.validator.check(&body)?;
        Ok(RawDocument::new(body))
    }
}
