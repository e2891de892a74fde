use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier
    pub session_id: String,

    /// Whether the session loop is still running
    pub is_running: bool,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Total uptime in seconds
    pub uptime_secs: f64,

    /// Number of distinct reconciled transcript messages
    pub transcript_message_count: usize,

    /// Number of chat events received
    pub chat_event_count: usize,
}
