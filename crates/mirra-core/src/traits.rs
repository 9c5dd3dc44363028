use std::future::Future;

use crate::error::AppError;

/// Fetches the raw body behind a URL.
///
/// Implementations return any HTTP response body as `Ok`, whatever its
/// status code; only transport-level failures are errors. Judging whether
/// the body is usable is the validator's job.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}
