use serde::{Deserialize, Serialize};

/// Which audio track a transcription segment came from
///
/// Segment ids are only unique within one source, so the reconciler keys
/// everything by `(SourceId, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// The remote agent's audio track
    Agent,
    /// The local participant's microphone track
    Local,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Agent => "agent",
            SourceId::Local => "local",
        }
    }
}

/// The participant a segment or chat event originates from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "identity", rename_all = "snake_case")]
pub enum ParticipantId {
    /// The local participant (this client)
    Local,
    /// A remote participant, carrying its transport-level identity
    Remote(String),
}

impl ParticipantId {
    pub fn is_local(&self) -> bool {
        matches!(self, ParticipantId::Local)
    }
}

/// A single unit of streaming transcription output
///
/// The id is stable across revisions of the same utterance: sources keep
/// re-sending a segment with updated text until `is_final` is set, after
/// which the text will not change again. Missing fields deserialize to
/// their defaults so a sparse upstream payload is still accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Stable identifier, unique within the segment's source
    #[serde(default)]
    pub id: String,

    /// Transcribed text, may grow or shrink across revisions
    #[serde(default)]
    pub text: String,

    /// Whether this revision is final (text will not change again)
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

impl TranscriptSegment {
    pub fn partial(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_final: true,
        }
    }
}
