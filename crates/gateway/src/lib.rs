//! HTTP API gateway for GodChat.
//!
//! Endpoints:
//!
//! - `POST /api/chat`    — Relay a message, get the assistant reply
//! - `GET  /api/history` — Admin transcript view (bearer-token guarded)
//! - `GET  /health`      — Liveness check
//!
//! The gateway is thin by design: it translates between HTTP and the
//! orchestrator's request/response contract, and nothing else. Page
//! rendering, export buttons, and login flows belong to external
//! collaborators that consume these endpoints.
//!
//! Built on Axum for high performance async HTTP.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use godchat_core::error::ChatError;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::{Role, SessionId, Turn};
use godchat_orchestrator::{ChatOrchestrator, ChatRequest, ContextAssembler};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: ChatOrchestrator,
    /// Bearer token guarding `/api/history`. `None` leaves the endpoint
    /// open — local development only.
    pub admin_token: Option<String>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/history", get(history_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Builds the store, completion client, and orchestrator ONCE from config
/// and shares them across requests — no per-request construction, no
/// ambient singletons.
pub async fn start(config: godchat_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let db_path = config.transcript.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store: Arc<dyn TranscriptStore> = Arc::new(
        godchat_transcript::SqliteTranscript::new(&format!("sqlite://{}", db_path.display()))
            .await?,
    );

    let completion = Arc::new(godchat_providers::build_from_config(&config));
    let assembler = ContextAssembler::from_config(&config);

    let state = Arc::new(GatewayState {
        orchestrator: ChatOrchestrator::new(store, completion, assembler),
        admin_token: config.gateway.admin_token.clone(),
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Serialize)]
struct ChatResponse {
    role: Role,
    content: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct HistoryParams {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default = "default_history_limit")]
    limit: usize,
}

fn default_history_limit() -> usize {
    100
}

#[derive(Serialize)]
struct HistoryResponse {
    turns: Vec<TurnDto>,
    count: usize,
}

#[derive(Serialize)]
struct TurnDto {
    id: String,
    session_id: String,
    role: Role,
    content: String,
    created_at: String,
}

impl From<&Turn> for TurnDto {
    fn from(turn: &Turn) -> Self {
        Self {
            id: turn.id.clone(),
            session_id: turn.session_id.to_string(),
            role: turn.role,
            content: turn.content.clone(),
            created_at: turn.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let reply = state
        .orchestrator
        .handle(payload)
        .await
        .map_err(error_response)?;

    Ok(Json(ChatResponse {
        role: reply.role,
        content: reply.content,
    }))
}

/// Map the request-level error taxonomy onto HTTP status classes:
/// 400 for caller-fixable input, 502/503 for the completion boundary,
/// 500 for persistence and malformed-success anomalies.
fn error_response(err: ChatError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, error, detail) = match err {
        ChatError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
        ChatError::Unavailable(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "completion endpoint unreachable".into(),
            Some(serde_json::json!(msg)),
        ),
        ChatError::Upstream { status, message } => (
            StatusCode::BAD_GATEWAY,
            message,
            Some(serde_json::json!({ "upstream_status": status })),
        ),
        ChatError::EmptyReply => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "completion endpoint returned no reply".into(),
            None,
        ),
        ChatError::Persistence(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "transcript store failure".into(),
            Some(serde_json::json!(msg)),
        ),
    };

    (status, Json(ErrorResponse { error, detail }))
}

async fn history_handler(
    State(state): State<SharedState>,
    headers: axum::http::HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    // Authorization is a capability of this admin surface, not of the
    // orchestration contract: check the bearer token here, before touching
    // the store.
    if let Some(expected) = &state.admin_token {
        let provided = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if provided != Some(expected.as_str()) {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "invalid or missing bearer token".into(),
                    detail: None,
                }),
            ));
        }
    }

    let store = state.orchestrator.store();
    let turns = match &params.session_id {
        Some(sid) => store.history(&SessionId::from(sid), params.limit).await,
        None => store.tail(params.limit).await,
    }
    .map_err(|e| error_response(e.into()))?;

    let dtos: Vec<TurnDto> = turns.iter().map(TurnDto::from).collect();
    let count = dtos.len();

    Ok(Json(HistoryResponse { turns: dtos, count }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────
