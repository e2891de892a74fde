use super::segment::{ParticipantId, SourceId, TranscriptSegment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Suffix appended to the text of a segment that is still being revised
pub const IN_PROGRESS_MARKER: &str = " ...";

/// Key for a reconciled message: segment ids are only unique per source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageKey {
    pub source: SourceId,
    pub segment_id: String,
}

impl MessageKey {
    pub fn new(source: SourceId, segment_id: impl Into<String>) -> Self {
        Self {
            source,
            segment_id: segment_id.into(),
        }
    }
}

/// One logical message derived from all revisions of a segment id
///
/// The timestamp is assigned when the id is first seen and never changes,
/// so later revisions cannot reorder the message in the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledMessage {
    /// Display name of the speaker ("You" for the local participant)
    pub speaker_name: String,

    /// Latest text, suffixed with the in-progress marker while partial
    pub display_text: String,

    /// Whether the local participant spoke this
    pub is_self: bool,

    /// Whether the underlying segment has been finalized
    pub is_final: bool,

    /// First-sight timestamp; the timeline's sole ordering authority
    pub timestamp: DateTime<Utc>,

    /// Set at most once when enrichment completes
    pub translation: Option<String>,

    /// Set at most once when enrichment completes
    pub summary: Option<String>,
}

/// Id-keyed upsert map over both segment sources
///
/// Sources deliver whole-set snapshots, not diffs, so the reconciler is
/// written to tolerate full re-delivery of already-seen segments: an
/// unchanged segment upserts to an identical message. There is a single
/// writer context; callers pull the full mapping each update tick.
pub struct SegmentReconciler {
    agent_label: String,
    local_label: String,
    messages: HashMap<MessageKey, ReconciledMessage>,
    /// First-sight order, for deterministic iteration and stable ties
    order: Vec<MessageKey>,
}

impl SegmentReconciler {
    pub fn new(agent_label: impl Into<String>) -> Self {
        Self {
            agent_label: agent_label.into(),
            local_label: "You".to_string(),
            messages: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Upsert one segment, assigning `seen_at` if the id is new
    ///
    /// Returns true when this call transitioned the message to final.
    /// Revisions replace the display text but never touch the timestamp,
    /// speaker, or enrichment fields.
    pub fn upsert_at(
        &mut self,
        source: SourceId,
        segment: &TranscriptSegment,
        speaker: &ParticipantId,
        seen_at: DateTime<Utc>,
    ) -> bool {
        let key = MessageKey::new(source, segment.id.clone());
        let display_text = if segment.is_final {
            segment.text.clone()
        } else {
            format!("{}{}", segment.text, IN_PROGRESS_MARKER)
        };

        match self.messages.get_mut(&key) {
            Some(existing) => {
                let newly_final = segment.is_final && !existing.is_final;
                existing.display_text = display_text;
                existing.is_final = existing.is_final || segment.is_final;
                newly_final
            }
            None => {
                let is_self = speaker.is_local();
                let speaker_name = if is_self {
                    self.local_label.clone()
                } else {
                    self.agent_label.clone()
                };
                debug!(
                    source = source.as_str(),
                    segment_id = %segment.id,
                    "first sight of segment"
                );
                self.messages.insert(
                    key.clone(),
                    ReconciledMessage {
                        speaker_name,
                        display_text,
                        is_self,
                        is_final: segment.is_final,
                        timestamp: seen_at,
                        translation: None,
                        summary: None,
                    },
                );
                self.order.push(key);
                segment.is_final
            }
        }
    }

    /// Upsert one segment with the current time as its first-sight timestamp
    pub fn upsert(
        &mut self,
        source: SourceId,
        segment: &TranscriptSegment,
        speaker: &ParticipantId,
    ) -> bool {
        self.upsert_at(source, segment, speaker, Utc::now())
    }

    /// Upsert a whole snapshot from one source
    ///
    /// Returns the keys that became final during this pass, in snapshot
    /// order. Already-final re-deliveries are not reported again.
    pub fn apply_snapshot(
        &mut self,
        source: SourceId,
        segments: &[TranscriptSegment],
        speaker: &ParticipantId,
    ) -> Vec<MessageKey> {
        let mut newly_final = Vec::new();
        for segment in segments {
            if self.upsert(source, segment, speaker) {
                newly_final.push(MessageKey::new(source, segment.id.clone()));
            }
        }
        newly_final
    }

    pub fn get(&self, source: SourceId, segment_id: &str) -> Option<&ReconciledMessage> {
        self.messages.get(&MessageKey::new(source, segment_id))
    }

    pub fn get_by_key(&self, key: &MessageKey) -> Option<&ReconciledMessage> {
        self.messages.get(key)
    }

    /// Fill in enrichment output for a message, at most once per field
    ///
    /// An already-set translation or summary is never overwritten, so a
    /// re-delivered enrichment result is a no-op.
    pub fn set_enrichment(
        &mut self,
        key: &MessageKey,
        translation: Option<&str>,
        summary: Option<&str>,
    ) {
        if let Some(message) = self.messages.get_mut(key) {
            if message.translation.is_none() {
                message.translation = translation.map(str::to_string);
            }
            if message.summary.is_none() {
                message.summary = summary.map(str::to_string);
            }
        }
    }

    /// All reconciled messages in first-sight order
    pub fn messages(&self) -> impl Iterator<Item = &ReconciledMessage> {
        self.order.iter().filter_map(|key| self.messages.get(key))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Discard the whole mapping (session disconnect)
    pub fn clear(&mut self) {
        self.messages.clear();
        self.order.clear();
    }
}
