//! Test utilities: a scripted mock fetcher and markup fixtures.
//!
//! The mock records every requested URL behind `Arc<Mutex<_>>`, allowing
//! assertions on call order and count.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::traits::Fetcher;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Body(String),
    /// Fails with `AppError::NetworkError(msg)`.
    NetworkError(String),
    /// Never resolves; only a timeout ends the attempt.
    Hang,
}

/// Mock fetcher with per-URL response queues.
///
/// Each call pops the front of the URL's queue; the last entry repeats
/// forever. URLs without a script fail with a connection error.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, Vec<MockResponse>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(self, url: &str, responses: Vec<MockResponse>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), responses);
        self
    }

    pub fn with_body(self, url: &str, body: impl Into<String>) -> Self {
        self.with_responses(url, vec![MockResponse::Body(body.into())])
    }

    pub fn with_error(self, url: &str, message: &str) -> Self {
        self.with_responses(url, vec![MockResponse::NetworkError(message.to_string())])
    }

    pub fn with_hang(self, url: &str) -> Self {
        self.with_responses(url, vec![MockResponse::Hang])
    }

    /// Every URL requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_response(&self, url: &str) -> Option<MockResponse> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(url)?;
        match queue.len() {
            0 => None,
            1 => queue.first().cloned(),
            _ => Some(queue.remove(0)),
        }
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());

        match self.next_response(url) {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::NetworkError(message)) => Err(AppError::NetworkError(message)),
            Some(MockResponse::Hang) => std::future::pending().await,
            None => Err(AppError::NetworkError(format!(
                "Connection failed: no route for {url}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A profile page in the markup served by current mirrors.
pub fn profile_page(
    name: &str,
    bio: &str,
    followers: &str,
    following: &str,
    posts: &[&str],
) -> String {
    let timeline: String = posts
        .iter()
        .map(|p| {
            format!(
                r#"<div class="timeline-item"><div class="tweet-body"><div class="tweet-content media-body">{p}</div></div></div>"#
            )
        })
        .collect();

    format!(
        r#"<html><body>
<div class="profile-card">
  <div class="profile-card-info">
    <a class="profile-card-fullname" href="/x">{name}</a>
  </div>
  <div class="profile-bio"><p>{bio}</p></div>
  <ul class="profile-statlist">
    <li class="posts"><span class="profile-stat-header">Tweets</span><span class="profile-stat-num">10</span></li>
    <li class="following"><span class="profile-stat-header">Following</span><span class="profile-stat-num">{following}</span></li>
    <li class="followers"><span class="profile-stat-header">Followers</span><span class="profile-stat-num">{followers}</span></li>
  </ul>
</div>
<div class="timeline">{timeline}</div>
</body></html>"#
    )
}

/// A rate-limit page that passes no validation marker.
pub fn rate_limited_page() -> String {
    "<html><body><h1>Instance has been rate limited.</h1></body></html>".to_string()
}
