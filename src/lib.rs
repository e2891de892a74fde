pub mod config;
pub mod enrichment;
pub mod http;
pub mod session;
pub mod transcript;

pub use config::Config;
pub use enrichment::{
    Enrichment, EnrichmentPipeline, EnrichmentResult, FieldExtractor, FieldKind, FieldUpdate,
    KeywordExtractor, NoopExtractor, SessionFields,
};
pub use http::{create_router, AppState, SessionDefaults};
pub use session::{ChatFeed, ConversationSession, SegmentFeed, SessionConfig, SessionStats};
pub use transcript::{
    assemble, ChatEvent, ConversationEntry, MessageKey, ParticipantId, ReconciledMessage,
    SegmentReconciler, SourceId, SpeakerLabels, TranscriptSegment,
};
