//! HTTP API for the homework assistant.
//!
//! A thin axum layer over [`HomeworkService`]. Handlers parse the request,
//! call one service method and serialize the result; all answering logic
//! lives in the service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Plain-text banner |
//! | `GET`  | `/health` | Status, version and indexed document count |
//! | `GET`  | `/resources` | Resources catalogue (grade → subject → topics) |
//! | `POST` | `/ask` | Strict CAPS topic lookup |
//! | `POST` | `/answer` | CAPS lookup with textbook fallback |
//! | `POST` | `/pdf/search` | Raw textbook retrieval with snippets |
//! | `POST` | `/pdf/reindex` | Rebuild the textbook index |
//! | `POST` | `/calculate` | Evaluate an arithmetic expression |
//!
//! # Error Contract
//!
//! Errors use one JSON shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Question is required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `internal` (500). A retrieval miss is
//! not an error; it is a `200` with `found: false`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser front end
//! can be served from anywhere.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::calc::AngleMode;
use crate::config::Config;
use crate::error::ServiceError;
use crate::service::{
    AnswerResponse, AskResponse, HomeworkService, QuestionRequest, SearchRequest, SearchResponse,
};

pub const BANNER: &str = "Homework Assistant API (NO AI) running";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    service: Arc<HomeworkService>,
}

/// Starts the HTTP server on `[server].bind` and runs until the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(HomeworkService::from_config(config)?);
    info!(
        documents = service.index().len(),
        topics = service.topics().len(),
        "loaded library"
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("homework assistant listening on http://{}", config.server.bind);
    axum::serve(listener, router(service)).await?;

    Ok(())
}

/// Builds the application router around an existing service.
pub fn router(service: Arc<HomeworkService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/resources", get(handle_resources))
        .route("/ask", post(handle_ask))
        .route("/answer", post(handle_answer))
        .route("/pdf/search", post(handle_search))
        .route("/pdf/reindex", post(handle_reindex))
        .route("/calculate", post(handle_calculate))
        .layer(cors)
        .with_state(AppState { service })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        if err.is_client_error() {
            bad_request(err.to_string())
        } else {
            error!(error = %err, "request failed");
            internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

// ============ GET / ============

async fn handle_root() -> &'static str {
    BANNER
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    /// Number of documents in the current index snapshot.
    documents: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        documents: state.service.index().len(),
    })
}

// ============ GET /resources ============

async fn handle_resources(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.service.resources().clone())
}

// ============ POST /ask, /answer ============

async fn handle_ask(
    State(state): State<AppState>,
    payload: Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.service.ask(&request)?))
}

async fn handle_answer(
    State(state): State<AppState>,
    payload: Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.service.answer(&request)?))
}

// ============ POST /pdf/search ============

async fn handle_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.service.search(&request)?))
}

// ============ POST /pdf/reindex ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReindexResponse {
    ok: bool,
    updated_at: chrono::DateTime<chrono::Utc>,
    pdf_count: usize,
}

async fn handle_reindex(State(state): State<AppState>) -> Result<Json<ReindexResponse>, AppError> {
    let summary = state.service.reindex().await?;
    Ok(Json(ReindexResponse {
        ok: true,
        updated_at: summary.updated_at,
        pdf_count: summary.document_count,
    }))
}

// ============ POST /calculate ============

#[derive(Deserialize)]
struct CalculateRequest {
    #[serde(default)]
    expression: Option<String>,
    /// `"deg"` (default) or `"rad"`.
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Serialize)]
struct CalculateResponse {
    ok: bool,
    result: f64,
}

async fn handle_calculate(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, AppError> {
    let Json(request) = payload?;
    let expression = request
        .expression
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| bad_request("expression is required"))?;
    let mode = match request.mode.as_deref().map(str::trim) {
        None | Some("") | Some("deg") => AngleMode::Degrees,
        Some("rad") => AngleMode::Radians,
        Some(other) => {
            return Err(bad_request(format!(
                "invalid mode '{}': expected 'deg' or 'rad'",
                other
            )))
        }
    };

    let result = state.service.calculate(&expression, mode)?;
    Ok(Json(CalculateResponse { ok: true, result }))
}
