//! Transcript reconciliation and timeline assembly
//!
//! This module provides the core of the conversation log:
//! - Segment and participant data model
//! - Id-keyed upsert reconciliation across both audio tracks
//! - Timestamp-ordered assembly of segments and chat into one timeline

mod reconciler;
mod segment;
mod timeline;

pub use reconciler::{
    MessageKey, ReconciledMessage, SegmentReconciler, IN_PROGRESS_MARKER,
};
pub use segment::{ParticipantId, SourceId, TranscriptSegment};
pub use timeline::{assemble, ChatEvent, ConversationEntry, SpeakerLabels};
