//! HTTP server exposing the chat and product-search API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/chat` | Run a chat turn, returning `{reply, products}` |
//! | `POST` | `/api/products/search` | Ranked product search for a free-text query |
//! | `GET`  | `/api/products/{id}` | Fetch one catalog item by id |
//! | `POST` | `/api/moodboard/pin` | Acknowledge a pin (no persistence) |
//! | `DELETE` | `/api/moodboard/unpin/{id}` | Acknowledge an unpin (no persistence) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "messages must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `upstream_error`
//! (502, the text-generation service failed on the final reply), `internal`
//! (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support the browser
//! client.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::cache::{EmbeddingCache, ResponseCache};
use crate::catalog::CatalogStore;
use crate::chat::{run_chat_turn, ChatPipeline, OpenAiChatProvider};
use crate::config::Config;
use crate::embedding;
use crate::error::Error;
use crate::intent::IntentClassifier;
use crate::models::{CatalogItem, ChatOutcome, ChatTurn};
use crate::search::RetrievalEngine;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    catalog: Arc<CatalogStore>,
    engine: Arc<RetrievalEngine>,
    pipeline: Arc<ChatPipeline>,
}

/// Starts the HTTP server.
///
/// Loads the catalog, builds the providers and caches from configuration,
/// and binds to `[server].bind`. Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let catalog = Arc::new(CatalogStore::load(&config.catalog.path));
    println!("Loaded {} catalog items.", catalog.len());

    let embedding_provider: Arc<dyn embedding::EmbeddingProvider> =
        embedding::create_provider(&config.embedding)?.into();
    let chat_provider: Arc<dyn crate::chat::ChatProvider> =
        Arc::new(OpenAiChatProvider::new(&config.chat)?);

    let engine = Arc::new(RetrievalEngine::new(
        catalog.clone(),
        Arc::new(EmbeddingCache::new()),
        embedding_provider,
        config,
    ));

    let pipeline = Arc::new(ChatPipeline {
        engine: engine.clone(),
        intent: IntentClassifier::from_config(&config.intent, chat_provider.clone())?,
        chat: chat_provider,
        responses: Arc::new(ResponseCache::new(Duration::from_secs(
            config.cache.response_ttl_secs,
        ))),
    });

    let state = AppState {
        catalog,
        engine,
        pipeline,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/api/products/search", post(handle_product_search))
        .route("/api/products/{id}", get(handle_product_by_id))
        .route("/api/moodboard/pin", post(handle_moodboard_pin))
        .route("/api/moodboard/unpin/{id}", delete(handle_moodboard_unpin))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("Showroom server listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g. `"bad_request"`, `"not_found"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an HTTP response.
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

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidInput(msg) => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "bad_request".to_string(),
                message: msg,
            },
            Error::Provider(msg) => AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "upstream_error".to_string(),
                message: msg,
            },
            Error::NotFound(id) => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found".to_string(),
                message: format!("product {} not found", id),
            },
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/chat ============

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    messages: Vec<ChatTurn>,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, AppError> {
    let outcome = run_chat_turn(&state.pipeline, &req.messages).await?;
    Ok(Json(outcome))
}

// ============ POST /api/products/search ============

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
}

async fn handle_product_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Json<Vec<CatalogItem>> {
    Json(state.engine.search(&req.query).await)
}

// ============ GET /api/products/{id} ============

async fn handle_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<CatalogItem>, AppError> {
    state
        .catalog
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::NotFound(id).into())
}

// ============ Moodboard stubs ============

/// Pin persistence was never implemented; the endpoint only confirms so
/// the client flow works end to end.
#[derive(Serialize)]
struct MoodboardResponse {
    success: bool,
    message: String,
}

async fn handle_moodboard_pin() -> Json<MoodboardResponse> {
    Json(MoodboardResponse {
        success: true,
        message: "Product pinned".to_string(),
    })
}

async fn handle_moodboard_unpin(Path(_id): Path<u32>) -> Json<MoodboardResponse> {
    Json(MoodboardResponse {
        success: true,
        message: "Product unpinned".to_string(),
    })
}
