use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use mirra_core::{FailureKind, ScrapeOutcome};

use crate::dto::{HealthResponse, ScrapeRequest, ScrapeResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/scrape", post(scrape))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// HTTP status for a lookup outcome.
pub fn outcome_status(outcome: &ScrapeOutcome) -> StatusCode {
    match outcome.failure_kind() {
        None => StatusCode::OK,
        Some(FailureKind::InvalidInput) => StatusCode::BAD_REQUEST,
        Some(FailureKind::NotFound | FailureKind::EmptyContent) => StatusCode::NOT_FOUND,
        Some(FailureKind::AllEndpointsFailed) => StatusCode::BAD_GATEWAY,
        Some(FailureKind::DeadlineExceeded) => StatusCode::GATEWAY_TIMEOUT,
    }
}

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Profile found", body = ScrapeResponse),
        (status = 400, description = "Missing or invalid username", body = ScrapeResponse),
        (status = 404, description = "Profile missing, private, or without posts", body = ScrapeResponse),
        (status = 502, description = "Every mirror failed", body = ScrapeResponse),
        (status = 504, description = "Lookup deadline exceeded", body = ScrapeResponse),
    ),
    tag = "scrape"
)]
pub async fn scrape(
    State(state): State<Arc<AppState>>,
    body: Result<axum::Json<ScrapeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let axum::Json(body) = body?;

    let Some(username) = body.username.filter(|u| !u.trim().is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            axum::Json(ScrapeResponse::missing_username()),
        ));
    };

    let outcome = state.service.lookup(&username).await;
    let status = outcome_status(&outcome);

    Ok((status, axum::Json(ScrapeResponse::from(outcome))))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse { status: "ok" })
}
