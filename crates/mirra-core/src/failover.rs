use crate::error::LookupError;
use crate::models::{Endpoint, FetchAttempt, RawDocument};
use crate::retry::RetryExecutor;
use crate::traits::Fetcher;

/// A validated document and the mirror that served it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub endpoint: Endpoint,
    pub document: RawDocument,
}

/// Walks the endpoint pool strictly in order, one endpoint at a time.
///
/// An endpoint is abandoned only after its retries are spent; the first
/// validated document wins. When every endpoint fails, the per-endpoint
/// errors are reported in pool order.
pub struct FailoverOrchestrator<'a, F> {
    endpoints: &'a [Endpoint],
    executor: RetryExecutor<'a, F>,
}

impl<'a, F: Fetcher> FailoverOrchestrator<'a, F> {
    pub fn new(endpoints: &'a [Endpoint], executor: RetryExecutor<'a, F>) -> Self {
        Self {
            endpoints,
            executor,
        }
    }

    pub async fn fetch_profile_page(
        &self,
        username: &str,
        attempts: &mut Vec<FetchAttempt>,
    ) -> Result<FetchedDocument, LookupError> {
        let mut details = Vec::with_capacity(self.endpoints.len());

        for endpoint in self.endpoints {
            let url = match endpoint.profile_url(username) {
                Ok(url) => url,
                Err(err) => {
                    tracing::warn!(%endpoint, error = %err, "Skipping endpoint");
                    details.push(format!("{endpoint}: {err}"));
                    continue;
                }
            };

            tracing::info!(%endpoint, %url, "Trying endpoint");
            match self.executor.fetch(endpoint, &url, attempts).await {
                Ok(document) => {
                    return Ok(FetchedDocument {
                        endpoint: endpoint.clone(),
                        document,
                    });
                }
                Err(err) => {
                    tracing::warn!(%endpoint, error = %err, "Endpoint exhausted");
                    details.push(format!("{endpoint}: {err}"));
                }
            }
        }

        Err(LookupError::AllEndpointsFailed { details })
    }
}
