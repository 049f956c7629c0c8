//! JSON HTTP surface over the tag repository.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Status, version, tag count and load time |
//! | `GET`  | `/tags` | Hoisted tags |
//! | `GET`  | `/tags/{query}` | Resolve a query to a tag (`?target=` adds a suggestion line) |
//! | `GET`  | `/tags/{query}/similar` | Closest tags to a query (`?limit=`) |
//! | `GET`  | `/autocomplete` | Ranked choices for a partial query (`?query=`) |
//! | `POST` | `/reload` | Reload tags, optionally from the remote copy |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "❌ Could not find a tag ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `reload_failed` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use doctags_core::autocomplete::Choice;
use doctags_core::render::{
    not_found_message, reload_failure_message, reload_success_message, suggestion_message,
};
use doctags_core::similarity::SimilarityEntry;
use doctags_core::{ReloadOutcome, Tag};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::repository::TagRepository;

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    repo: Arc<TagRepository>,
    /// Held for the whole of a reload so reloads never interleave.
    reload_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(repo: Arc<TagRepository>) -> Self {
        Self {
            repo,
            reload_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the router. Split out from [`run_server`] for tests.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/tags", get(handle_hoisted))
        .route("/tags/{query}", get(handle_tag))
        .route("/tags/{query}/similar", get(handle_similar))
        .route("/autocomplete", get(handle_autocomplete))
        .route("/reload", post(handle_reload))
        .layer(cors)
        .with_state(state)
}

/// Load the local tags, then serve on `[server].bind` until the process exits.
///
/// A failed initial load is fatal: there is no previous set to fall back to.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let repo = Arc::new(TagRepository::new(config.clone()));
    let size = repo.load(false).await?;

    let app = router(AppState::new(repo));

    info!(bind = %bind_addr, tags = size, "doctags server starting");
    println!("doctags server listening on http://{} ({} tags)", bind_addr, size);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
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

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn reload_failed(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "reload_failed".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    tags: usize,
    loaded_at: Option<DateTime<Utc>>,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tags: state.repo.len(),
        loaded_at: state.repo.loaded_at(),
    })
}

// ============ GET /tags ============

async fn handle_hoisted(State(state): State<AppState>) -> Json<Vec<Tag>> {
    Json(state.repo.hoisted())
}

// ============ GET /tags/{query} ============

#[derive(Deserialize)]
struct TagParams {
    target: Option<String>,
}

#[derive(Serialize)]
struct TagResponse {
    name: String,
    content: String,
    /// `content`, prefixed with a suggestion line when a target was given.
    message: String,
}

async fn handle_tag(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<TagParams>,
) -> Result<Json<TagResponse>, AppError> {
    match state.repo.lookup(&query) {
        Some(tag) => {
            let message = suggestion_message("tag", &tag.content, params.target.as_deref());
            Ok(Json(TagResponse {
                name: tag.name,
                content: tag.content,
                message,
            }))
        }
        None => {
            let suggestions = state.repo.suggest(&query);
            Err(not_found(not_found_message(query.trim(), &suggestions)))
        }
    }
}

// ============ GET /tags/{query}/similar ============

#[derive(Deserialize)]
struct SimilarParams {
    limit: Option<usize>,
}

async fn handle_similar(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<Vec<SimilarityEntry>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(state.repo.config().similarity.limit);
    if limit == 0 {
        return Err(bad_request("limit must be at least 1"));
    }
    Ok(Json(state.repo.find_similar(&query, limit)))
}

// ============ GET /autocomplete ============

#[derive(Deserialize)]
struct AutocompleteParams {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct AutocompleteResponse {
    choices: Vec<Choice>,
}

async fn handle_autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> Json<AutocompleteResponse> {
    Json(AutocompleteResponse {
        choices: state.repo.autocomplete(&params.query),
    })
}

// ============ POST /reload ============

#[derive(Deserialize, Default)]
struct ReloadRequest {
    #[serde(default)]
    remote: bool,
}

#[derive(Serialize)]
struct ReloadResponse {
    #[serde(flatten)]
    outcome: ReloadOutcome,
    message: String,
}

/// Accepts an empty body or `{"remote": bool}`.
async fn handle_reload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ReloadResponse>, AppError> {
    let req: ReloadRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ReloadRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| bad_request(format!("invalid body: {}", e)))?
    };

    let _guard = state.reload_lock.lock().await;
    match state.repo.reload(req.remote).await {
        Ok(outcome) => Ok(Json(ReloadResponse {
            message: reload_success_message(&outcome),
            outcome,
        })),
        Err(e) => Err(reload_failed(reload_failure_message(
            req.remote,
            state.repo.len(),
            &format!("{:#}", e),
        ))),
    }
}
