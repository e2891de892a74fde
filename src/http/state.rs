use crate::enrichment::{FieldExtractor, KeywordExtractor};
use crate::session::ConversationSession;
use crate::transcript::{ChatEvent, TranscriptSegment};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// A running session plus the feed inputs its transport adapter pushes to
pub struct SessionHandle {
    pub session: Arc<ConversationSession>,

    /// Full-set snapshot input for the agent track
    pub agent_segments: watch::Sender<Vec<TranscriptSegment>>,

    /// Full-set snapshot input for the local microphone track
    pub local_segments: watch::Sender<Vec<TranscriptSegment>>,

    /// Append-only chat history input
    pub chat_events: watch::Sender<Vec<ChatEvent>>,
}

/// Defaults applied to sessions that don't specify their own
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub agent_label: String,
    pub agent_identity: Option<String>,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            agent_label: "Agent".to_string(),
            agent_identity: None,
        }
    }
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active conversation sessions (session_id → handle)
    pub sessions: Arc<RwLock<HashMap<String, Arc<SessionHandle>>>>,

    pub defaults: SessionDefaults,

    /// Extraction strategy handed to every new session
    pub extractor: Arc<dyn FieldExtractor>,
}

impl AppState {
    pub fn new(defaults: SessionDefaults, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            defaults,
            extractor,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionDefaults::default(), Arc::new(KeywordExtractor))
    }
}
