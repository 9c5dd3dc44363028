use crate::error::AppError;

/// Cheap sanity gate for fetched bodies.
///
/// Mirrors answer with login walls, rate-limit notices, or empty shells
/// behind an HTTP 200. A body is accepted when it contains at least one
/// marker substring known to appear in real profile markup. Structural
/// correctness is left to the extractor.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    markers: Vec<String>,
}

impl ResponseValidator {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    /// An empty marker set accepts every body.
    pub fn is_profile_page(&self, body: &str) -> bool {
        self.markers.is_empty() || self.markers.iter().any(|m| body.contains(m.as_str()))
    }

    pub fn check(&self, body: &str) -> Result<(), AppError> {
        if self.is_profile_page(body) {
            Ok(())
        } else {
            Err(AppError::ValidationError(format!(
                "Response ({} bytes) does not contain profile markup",
                body.len()
            )))
        }
    }
}
