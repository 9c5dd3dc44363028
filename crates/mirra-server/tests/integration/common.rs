use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{Request, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tower::ServiceExt;

use mirra_client::ReqwestFetcher;
use mirra_core::config::RetryPolicy;
use mirra_core::{Endpoint, ProfileService, ScrapeConfig};
use mirra_server::routes;
use mirra_server::state::AppState;

/// Lookups in these tests are bounded well below the mirror's slow response.
pub const TEST_DEADLINE_MS: u64 = 1_500;

/// Start a local mirror serving canned profile pages. Returns its base URL.
///
/// - `jack`: a complete profile
/// - `ghost`: profile markup without a display name
/// - `quiet`: a timeline of reposts only
/// - `slow`: a complete profile after five seconds
/// - anything else: a 404 error page without profile markup
pub async fn spawn_mirror() -> String {
    let app = Router::new().route("/{username}", get(mirror_page));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port with nothing listening on it.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn mirror_page(Path(username): Path<String>) -> impl IntoResponse {
    match username.as_str() {
        "jack" => (
            StatusCode::OK,
            Html(profile_page(
                "Jack",
                "just setting up",
                "6.5M",
                "4,123",
                &["first post", "RT @biz: shared", "second post"],
            )),
        ),
        "ghost" => (
            StatusCode::OK,
            Html(profile_page("", "", "0", "0", &["orphan"])),
        ),
        "quiet" => (
            StatusCode::OK,
            Html(profile_page(
                "Quiet",
                "",
                "12",
                "3",
                &["RT @a: one", "RT @b: two"],
            )),
        ),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (
                StatusCode::OK,
                Html(profile_page("Slow", "", "1", "1", &["late"])),
            )
        }
        _ => (
            StatusCode::NOT_FOUND,
            Html(r#"<div class="error-panel"><span>User not found</span></div>"#.to_string()),
        ),
    }
}

fn profile_page(name: &str, bio: &str, followers: &str, following: &str, posts: &[&str]) -> String {
    let timeline: String = posts
        .iter()
        .map(|p| format!(r#"<div class="timeline-item"><div class="tweet-content">{p}</div></div>"#))
        .collect();

    format!(
        r#"<html><body>
<div class="profile-card">
  <a class="profile-card-fullname" href="/x">{name}</a>
  <div class="profile-bio"><p>{bio}</p></div>
  <ul class="profile-statlist">
    <li class="posts"><span class="profile-stat-num">99</span></li>
    <li class="following"><span class="profile-stat-num">{following}</span></li>
    <li class="followers"><span class="profile-stat-num">{followers}</span></li>
  </ul>
</div>
<div class="timeline">{timeline}</div>
</body></html>"#
    )
}

/// Lookup configuration pointing at `endpoints`, with short delays.
pub fn test_config(endpoints: &[String]) -> ScrapeConfig {
    ScrapeConfig {
        endpoints: endpoints
            .iter()
            .map(|e| Endpoint::parse(e).unwrap())
            .collect(),
        retry: RetryPolicy {
            max_retries: 2,
            base_delay_ms: 10,
            attempt_timeout_ms: 3_000,
        },
        overall_timeout_ms: Some(TEST_DEADLINE_MS),
        ..ScrapeConfig::default()
    }
}

/// Build the app router backed by a real HTTP fetcher.
pub fn setup_test_app(config: ScrapeConfig) -> Router {
    let fetcher = ReqwestFetcher::with_timeout(config.retry.attempt_timeout()).unwrap();
    let service = ProfileService::new(fetcher, config).unwrap();
    routes::router(Arc::new(AppState { service }))
}

/// POST a JSON body to `/api/scrape`, returning status and parsed body.
pub async fn post_scrape(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::post("/api/scrape")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}
