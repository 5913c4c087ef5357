//! HTTP/WebSocket Handlers

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::Response,
    routing::{delete, get, post},
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use agent_core::{AgentError, ERROR_MARKER, Session, SessionId};

use crate::envelope::Envelope;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub tools: Vec<String>,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct SessionList {
    pub sessions: Vec<SessionId>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn start_failed(e: &AgentError) -> ApiError {
    tracing::error!(error = %e, "Session start failed");
    api_error(StatusCode::SERVICE_UNAVAILABLE, "SESSION_START_FAILED", e.to_string())
}

fn bad_envelope(error: String) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "BAD_ENVELOPE", error)
}

/// Decode an inbound envelope and pull out its text
fn read_query(body: &[u8]) -> Result<String, String> {
    let envelope = Envelope::parse(body).map_err(|e| format!("Malformed envelope: {e}"))?;
    let query = envelope.extract_text();
    if query.trim().is_empty() {
        return Err("Envelope carries no text content".into());
    }
    Ok(query)
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/nlip", post(nlip_handler))
        .route("/nlip/", post(nlip_handler))
        .route("/nlip/ws", get(nlip_ws_handler))
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/nlip", post(session_nlip_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.info.model.clone(),
        tools: state.info.tools.clone(),
        sessions: state.registry.len().await,
    })
}

/// One-shot exchange: the session lives only for this request and is never
/// registered, so a dropped request leaves nothing behind.
pub async fn nlip_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Envelope>, ApiError> {
    let query = read_query(&body).map_err(bad_envelope)?;

    let session = state.registry.start_detached().await.map_err(|e| start_failed(&e))?;
    let answer = session.execute(&query).await;
    session.stop().await;

    Ok(Json(Envelope::text(answer)))
}

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let session = state.registry.create().await.map_err(|e| start_failed(&e))?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: session.id().clone(),
        }),
    ))
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionList> {
    Json(SessionList {
        sessions: state.registry.ids().await,
    })
}

pub async fn session_nlip_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Envelope>, ApiError> {
    let session = state
        .registry
        .get(&SessionId::from_string(id.clone()))
        .await
        .ok_or_else(|| {
            api_error(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", format!("No session {id}"))
        })?;

    let query = read_query(&body).map_err(bad_envelope)?;

    Ok(Json(Envelope::text(session.execute(&query).await)))
}

pub async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if state.registry.destroy(&SessionId::from_string(id)).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// ============================================================================
// WebSocket
// ============================================================================

/// One session per socket, destroyed when the socket closes
pub async fn nlip_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Reply to one text frame
pub async fn reply_to_frame(session: &Session, frame: &str) -> Envelope {
    match read_query(frame.as_bytes()) {
        Ok(query) => Envelope::text(session.execute(&query).await),
        Err(e) => Envelope::text(format!("{ERROR_MARKER}{e}")),
    }
}

fn encode(envelope: &Envelope) -> Option<Message> {
    serde_json::to_string(envelope)
        .ok()
        .map(|json| Message::Text(json.into()))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let session = match state.registry.create().await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "WebSocket session failed to start");
            if let Some(msg) = encode(&Envelope::text(format!("{ERROR_MARKER}{e}"))) {
                let _ = sender.send(msg).await;
            }
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    tracing::info!(session = %session.id(), "WebSocket connected");

    // Frames are read on their own task so a close is noticed while a query runs
    let (tx, mut rx) = mpsc::channel::<String>(16);
    let reader = {
        let session: Arc<Session> = session.clone();
        tokio::spawn(async move {
            while let Some(msg) = receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if tx.send(text.as_str().to_owned()).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Err(e) => {
                        tracing::warn!(session = %session.id(), error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
            session.cancel();
        })
    };

    while let Some(frame) = rx.recv().await {
        let reply = reply_to_frame(&session, &frame).await;
        let Some(msg) = encode(&reply) else { continue };
        if sender.send(msg).await.is_err() {
            break;
        }
    }

    reader.abort();
    state.registry.destroy(session.id()).await;
    tracing::info!(session = %session.id(), "WebSocket disconnected");
}
