//! HTTP API server for session control and presentation reads
//!
//! This module provides a REST API around conversation sessions:
//! - POST /sessions/start - Create a session
//! - POST /sessions/:id/stop - Disconnect and discard a session
//! - POST /sessions/:id/segments/:source - Push a segment snapshot
//! - POST /sessions/:id/chat - Append an inbound chat event
//! - POST /sessions/:id/chat/send - Forward an outbound chat message
//! - GET /sessions/:id/timeline - Assembled conversation log
//! - GET /sessions/:id/fields - Detected session fields
//! - GET /sessions/:id/status - Session statistics
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, SessionDefaults, SessionHandle};
