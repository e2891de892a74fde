use super::state::{AppState, SessionHandle};
use crate::session::{ChatFeed, ConversationSession, SegmentFeed, SessionConfig, SessionStats};
use crate::transcript::{ChatEvent, ConversationEntry, ParticipantId, SourceId, TranscriptSegment};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Display label for the remote agent (default from config)
    pub agent_label: Option<String>,

    /// Transport identity of the agent participant
    pub agent_identity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
    pub stats: SessionStats,
}

#[derive(Debug, Deserialize)]
pub struct SendChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    /// Drop entries with an empty message (render-time policy)
    pub drop_empty: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found(session_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session {} not found", session_id),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions/start
/// Create a new conversation session
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()));

    info!("Starting session: {}", session_id);

    // Check for duplicates
    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&session_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Session {} already exists", session_id),
                }),
            )
                .into_response();
        }
    }

    let agent_identity = req
        .agent_identity
        .or_else(|| state.defaults.agent_identity.clone());

    let config = SessionConfig {
        session_id: session_id.clone(),
        agent_label: req
            .agent_label
            .unwrap_or_else(|| state.defaults.agent_label.clone()),
        agent_identity: agent_identity.clone(),
        ..Default::default()
    };

    let agent_speaker =
        ParticipantId::Remote(agent_identity.unwrap_or_else(|| "agent".to_string()));
    let (agent_tx, agent_feed) = SegmentFeed::new(SourceId::Agent, agent_speaker);
    let (local_tx, local_feed) = SegmentFeed::new(SourceId::Local, ParticipantId::Local);
    let (chat_tx, chat_feed) = ChatFeed::new();

    let session = Arc::new(ConversationSession::start(
        config,
        agent_feed,
        local_feed,
        chat_feed,
        Arc::clone(&state.extractor),
    ));

    let handle = Arc::new(SessionHandle {
        session,
        agent_segments: agent_tx,
        local_segments: local_tx,
        chat_events: chat_tx,
    });

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), handle);
    }

    info!("Session started successfully: {}", session_id);

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            session_id: session_id.clone(),
            status: "connected".to_string(),
            message: format!("Session {} started", session_id),
        }),
    )
        .into_response()
}

/// POST /sessions/:session_id/stop
/// Disconnect a session, discarding all of its state
pub async fn stop_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("Stopping session: {}", session_id);

    let handle = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match handle {
        Some(handle) => {
            let stats = handle.session.stop().await;
            (
                StatusCode::OK,
                Json(StopSessionResponse {
                    session_id: session_id.clone(),
                    status: "disconnected".to_string(),
                    message: "Session stopped".to_string(),
                    stats,
                }),
            )
                .into_response()
        }
        None => {
            error!("Session {} not found", session_id);
            not_found(&session_id)
        }
    }
}

/// POST /sessions/:session_id/segments/:source
/// Push a full segment snapshot for one track ("agent" or "local")
pub async fn push_segments(
    State(state): State<AppState>,
    Path((session_id, source)): Path<(String, String)>,
    Json(snapshot): Json<Vec<TranscriptSegment>>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(handle) = sessions.get(&session_id) else {
        return not_found(&session_id);
    };

    let sender = match source.as_str() {
        "agent" => &handle.agent_segments,
        "local" => &handle.local_segments,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Unknown segment source: {}", other),
                }),
            )
                .into_response();
        }
    };

    if sender.send(snapshot).is_err() {
        error!("Session loop for {} is no longer running", session_id);
        return (
            StatusCode::GONE,
            Json(ErrorResponse {
                error: format!("Session {} is no longer ingesting", session_id),
            }),
        )
            .into_response();
    }

    StatusCode::ACCEPTED.into_response()
}

/// POST /sessions/:session_id/chat
/// Append an inbound chat event to the session's chat history
pub async fn push_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(event): Json<ChatEvent>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(handle) = sessions.get(&session_id) else {
        return not_found(&session_id);
    };

    handle.chat_events.send_modify(|events| events.push(event));

    StatusCode::ACCEPTED.into_response()
}

/// POST /sessions/:session_id/chat/send
/// Forward an outbound chat message to the transport adapter
pub async fn send_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SendChatRequest>,
) -> impl IntoResponse {
    let sender = {
        let sessions = state.sessions.read().await;
        match sessions.get(&session_id) {
            Some(handle) => handle.session.chat_sender(),
            None => return not_found(&session_id),
        }
    };

    match sender.send(req.message).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => {
            error!("Failed to forward outbound chat: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Outbound chat channel is closed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /sessions/:session_id/timeline
/// Get the assembled conversation log
pub async fn get_timeline(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(handle) = sessions.get(&session_id) else {
        return not_found(&session_id);
    };

    let mut entries: Vec<ConversationEntry> = handle.session.timeline().await;
    if query.drop_empty.unwrap_or(false) {
        entries.retain(|entry| !entry.message.is_empty());
    }

    (StatusCode::OK, Json(entries)).into_response()
}

/// GET /sessions/:session_id/fields
/// Get the detected session fields
pub async fn get_fields(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    match sessions.get(&session_id) {
        Some(handle) => (StatusCode::OK, Json(handle.session.fields().await)).into_response(),
        None => not_found(&session_id),
    }
}

/// GET /sessions/:session_id/status
/// Get session statistics
pub async fn get_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    match sessions.get(&session_id) {
        Some(handle) => (StatusCode::OK, Json(handle.session.stats().await)).into_response(),
        None => not_found(&session_id),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
