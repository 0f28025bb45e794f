//! Web API module for Lodge.
//!
//! Serves the publish endpoint the admin tooling posts merged content to.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api/publish` - Commit content and images to the site repository

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::constants::MAX_PUBLISH_BODY_BYTES;
use crate::github::GitHubClient;
use crate::publish::{self, PublishError, PublishPayload, Publisher};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Secrets and repository coordinates.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Successful publish.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    /// Always true.
    pub ok: bool,
    /// SHA of the new commit.
    pub commit: String,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Always false.
    pub ok: bool,
    /// Error message.
    pub error: String,
    /// Upstream response body or other diagnostic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&PublishError> for ApiError {
    fn from(err: &PublishError) -> Self {
        Self {
            ok: false,
            error: err.to_string(),
            detail: err.detail(),
        }
    }
}

type ApiFailure = (StatusCode, Json<ApiError>);

fn failure(err: &PublishError) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::from(err)))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// /api/publish - Validate the request and commit it.
///
/// Every method is routed here so non-POST requests get the JSON 405 body.
async fn publish_content(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PublishResponse>, ApiFailure> {
    if method != Method::POST {
        return Err(failure(&PublishError::MethodNotAllowed));
    }
    let body = body.map_err(|rejection| {
        warn!("Rejected publish request body: {}", rejection.body_text());
        failure(&PublishError::UnreadableBody {
            reason: rejection.body_text(),
        })
    })?;

    let payload = PublishPayload::from_body(&body);
    let (plan, target) = publish::prepare(&payload, &state.config, Utc::now()).map_err(|err| {
        warn!("Rejected publish request: {}", err);
        failure(&err)
    })?;

    let client = GitHubClient::new(&target).map_err(|source| {
        failure(&PublishError::Upstream {
            step: publish::PublishStep::ReadRef,
            source,
        })
    })?;

    let commit = Publisher::new(&client, &target.branch, &plan)
        .run()
        .await
        .map_err(|err| failure(&err))?;

    Ok(Json(PublishResponse { ok: true, commit }))
}

// ============================================================================
// Router
// ============================================================================

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    router(state, MAX_PUBLISH_BODY_BYTES)
}

fn router(state: AppState, body_limit: usize) -> Router {
    // The admin page may be served from a different origin than the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/publish",
            any(publish_content).layer(DefaultBodyLimit::max(body_limit)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig, addr: SocketAddr) -> anyhow::Result<()> {
    if config.admin_pin.is_none() {
        warn!("ADMIN_PIN is not set; every publish will be refused");
    }
    if config.github.target().is_none() {
        warn!("GITHUB_TOKEN/GITHUB_OWNER/GITHUB_REPO incomplete; publishing is disabled");
    }

    let app = create_router(AppState::new(config));

    info!("Starting Lodge web server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
