//! HTTP API gateway for repliq.
//!
//! Endpoints:
//!
//! - `POST /api/query` — launch a run, stream its events over SSE
//! - `GET  /health`    — liveness check
//!
//! Built on Axum. Each event becomes one SSE frame as it occurs; the stream
//! ends with exactly one terminal frame — `{"type":"complete",...}` or
//! `{"type":"error",...}` — after all event frames. Invalid input is
//! rejected with HTTP 400 before any run worker is started.

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::Json,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
};
use futures::StreamExt;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use repliq_agent::{RunRequest, StreamItem, start_run};
use repliq_core::error::Error;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: repliq_config::AppConfig,
}

type SharedState = Arc<GatewayState>;

/// Contexts can be large; cap request bodies well above typical use.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/query", post(query_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: repliq_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState { config });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

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

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// `POST /api/query` — validate, launch the run, stream events as SSE.
async fn query_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RunRequest>,
) -> Result<
    Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>,
    (StatusCode, Json<ErrorResponse>),
> {
    info!(
        context_len = payload.context.len(),
        query_len = payload.query.len(),
        "api/query request"
    );

    let run_stream = start_run(&state.config, payload).map_err(|e| {
        let status = match &e {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let stream = futures::stream::unfold(run_stream, |mut rs| async move {
        rs.next().await.map(|item| (item, rs))
    })
    .map(|item| {
        let (name, payload) = frame(&item);
        Ok(SseEvent::default().event(name).data(payload))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Map a stream item to its SSE event name and data payload.
fn frame(item: &StreamItem) -> (&'static str, String) {
    match item {
        StreamItem::Event(event) => (
            event.data.event_type(),
            serde_json::to_string(event).unwrap_or_default(),
        ),
        StreamItem::Complete { answer, .. } => (
            "complete",
            serde_json::json!({ "type": "complete", "answer": answer }).to_string(),
        ),
        StreamItem::Failed { error } => (
            "error",
            serde_json::json!({ "type": "error", "error": error }).to_string(),
        ),
    }
}
