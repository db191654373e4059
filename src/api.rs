use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::error::ReadmeError;
use crate::service::ReadmeService;

/// Path of the generation endpoint
pub const GENERATE_PATH: &str = "/api/generate";

/// Request payload for README generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Public repository URL to clone
    #[serde(rename = "repoUrl", default)]
    pub repo_url: Option<String>,
}

/// Successful generation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated README text, unmodified
    pub readme: String,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description of the failure
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current status
    pub status: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
    /// Service uptime in seconds
    pub uptime: u64,
    /// Whether a model credential is configured
    pub generation_configured: bool,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    service: Arc<ReadmeService>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Wraps a service for use by the router
    pub fn new(service: ReadmeService) -> Self {
        Self {
            service: Arc::new(service),
            started_at: Utc::now(),
        }
    }
}

impl IntoResponse for ReadmeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.is_internal() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }
        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, ResponseJson(body)).into_response()
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route(GENERATE_PATH, get(generate_usage).post(generate_readme))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint - returns basic service information
async fn index() -> ResponseJson<Value> {
    ResponseJson(json!({
        "service": "readmesmith",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Generate a README for a public repository",
        "endpoints": {
            "health": "/health",
            "generate": GENERATE_PATH,
        }
    }))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> ResponseJson<HealthResponse> {
    let now = Utc::now();
    ResponseJson(HealthResponse {
        service: "readmesmith".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
        timestamp: now,
        uptime: (now - state.started_at).num_seconds().max(0) as u64,
        generation_configured: state.service.is_configured(),
    })
}

/// Static usage hint for the generation endpoint
async fn generate_usage() -> ResponseJson<Value> {
    ResponseJson(json!({
        "usage": format!(
            "POST a JSON body {{\"repoUrl\": \"https://github.com/owner/repo\"}} to {} to generate a README.",
            GENERATE_PATH
        ),
        "response": {"readme": "string"},
        "errors": {"400": "missing or invalid repoUrl", "500": "configuration, clone or generation failure"}
    }))
}

/// Generate a README endpoint
async fn generate_readme(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<ResponseJson<GenerateResponse>, ReadmeError> {
    if !state.service.is_configured() {
        return Err(ReadmeError::Config(
            "the model API key is not configured".to_string(),
        ));
    }

    let Json(request) = payload.map_err(|rejection| {
        ReadmeError::Validation(format!("expected a JSON body: {}", rejection.body_text()))
    })?;
    let repo_url = request
        .repo_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ReadmeError::Validation("missing required field 'repoUrl'".to_string()))?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate", %request_id);
    async move {
        info!("Generating README for {}", repo_url);
        let readme = state.service.generate(&repo_url).await?;
        info!("README generated ({} bytes)", readme.len());
        Ok::<_, ReadmeError>(ResponseJson(GenerateResponse { readme }))
    }
    .instrument(span)
    .await
}
