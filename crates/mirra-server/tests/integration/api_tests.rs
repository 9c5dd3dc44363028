use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use mirra_core::ScrapeConfig;
use mirra_server::config::ServerConfig;

use crate::integration::common::{
    dead_endpoint, post_scrape, setup_test_app, spawn_mirror, test_config,
};

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn scrape_returns_profile() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let (status, json) = post_scrape(app, r#"{"username": "jack"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let profile = &json["profile"];
    assert_eq!(profile["username"], "jack");
    assert_eq!(profile["name"], "Jack");
    assert_eq!(profile["bio"], "just setting up");
    assert_eq!(profile["followers"], 6_500_000);
    assert_eq!(profile["following"], 4_123);
    assert_eq!(
        profile["tweets"],
        serde_json::json!(["first post", "second post"])
    );
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn leading_at_is_stripped() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let (status, json) = post_scrape(app, r#"{"username": "  @jack "}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["profile"]["username"], "jack");
}

#[tokio::test]
async fn missing_username_returns_400() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    for body in [r#"{}"#, r#"{"username": null}"#, r#"{"username": "   "}"#] {
        let (status, json) = post_scrape(app.clone(), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Username is required");
    }
}

#[tokio::test]
async fn bare_at_sign_is_invalid_input() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let (status, json) = post_scrape(app, r#"{"username": "@"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "invalid_input");
    assert_eq!(json["error"], "Please enter a valid username");
}

#[tokio::test]
async fn malformed_json_returns_validation_error() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let (status, json) = post_scrape(app, "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .contains("Invalid request body")
    );
}

#[tokio::test]
async fn profile_without_name_returns_404() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let (status, json) = post_scrape(app, r#"{"username": "ghost"}"#).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "not_found");
    assert_eq!(
        json["error"],
        "Profile not found, is private, or has been suspended"
    );
}

#[tokio::test]
async fn profile_with_only_reposts_returns_404() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let (status, json) = post_scrape(app, r#"{"username": "quiet"}"#).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "empty_content");
}

#[tokio::test]
async fn dead_mirror_fails_over_to_live_one() {
    let endpoints = [dead_endpoint().await, spawn_mirror().await];
    let app = setup_test_app(test_config(&endpoints));

    let (status, json) = post_scrape(app, r#"{"username": "jack"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["profile"]["name"], "Jack");
}

#[tokio::test]
async fn every_mirror_failing_returns_502_with_details_in_order() {
    let dead = dead_endpoint().await;
    let live = spawn_mirror().await;
    let app = setup_test_app(test_config(&[dead.clone(), live.clone()]));

    let (status, json) = post_scrape(app, r#"{"username": "nobody"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["kind"], "all_endpoints_failed");

    let error = json["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to fetch profile data from all instances. Details: "));
    let dead_at = error.find(&dead).unwrap();
    let live_at = error.find(&live).unwrap();
    assert!(dead_at < live_at);
    assert!(error.contains("does not contain profile markup"));
}

#[tokio::test]
async fn slow_mirror_hits_deadline_and_returns_504() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let (status, json) = post_scrape(app, r#"{"username": "slow"}"#).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["success"], false);
    assert_eq!(json["kind"], "deadline_exceeded");
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let app = setup_test_app(test_config(&[spawn_mirror().await]));

    let response = app
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["paths"]["/api/scrape"]["post"].is_object());
    assert!(json["paths"]["/health"]["get"].is_object());
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let server = ServerConfig {
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        scrape: ScrapeConfig::default(),
    };
    let app = setup_test_app(test_config(&[spawn_mirror().await]))
        .layer(server.cors_layer().unwrap());

    let response = app
        .oneshot(
            Request::options("/api/scrape")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn cors_ignores_unknown_origin() {
    let server = ServerConfig {
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        scrape: ScrapeConfig::default(),
    };
    let app = setup_test_app(test_config(&[spawn_mirror().await]))
        .layer(server.cors_layer().unwrap());

    let response = app
        .oneshot(
            Request::options("/api/scrape")
                .header("origin", "https://evil.example")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}
