use serde::{Deserialize, Serialize};

/// Configuration for a conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Display label for the remote agent
    pub agent_label: String,

    /// Transport identity of the agent participant, when known
    /// (used to resolve display names for unnamed chat senders)
    pub agent_identity: Option<String>,

    /// Capacity of the outbound chat send channel
    pub outbound_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            agent_label: "Agent".to_string(),
            agent_identity: None,
            outbound_capacity: 64,
        }
    }
}
