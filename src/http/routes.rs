use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/sessions/start", post(handlers::start_session))
        .route("/sessions/:session_id/stop", post(handlers::stop_session))
        // Feed inputs (transport adapters push here)
        .route(
            "/sessions/:session_id/segments/:source",
            post(handlers::push_segments),
        )
        .route("/sessions/:session_id/chat", post(handlers::push_chat))
        // Outbound chat (send sink)
        .route("/sessions/:session_id/chat/send", post(handlers::send_chat))
        // Presentation reads
        .route(
            "/sessions/:session_id/timeline",
            get(handlers::get_timeline),
        )
        .route("/sessions/:session_id/fields", get(handlers::get_fields))
        .route("/sessions/:session_id/status", get(handlers::get_status))
        // Browser UIs consume this API directly
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
