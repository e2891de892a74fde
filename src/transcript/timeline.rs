use super::reconciler::ReconciledMessage;
use super::segment::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discrete text-chat message, independent of any audio track
///
/// Chat events are already final when they arrive and live in their own
/// identity namespace; they are never merged with segment-derived
/// messages even when the text coincides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Who sent the message
    pub sender: ParticipantId,

    /// Display name supplied by the chat source, if any
    #[serde(default)]
    pub sender_name: Option<String>,

    /// Message text
    pub text: String,

    /// Source-assigned send time, immutable
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// Display-name resolution for entries whose source gave no name
#[derive(Debug, Clone)]
pub struct SpeakerLabels {
    /// Label shown for the remote agent
    pub agent_label: String,

    /// Transport identity of the agent participant, when known
    pub agent_identity: Option<String>,
}

impl Default for SpeakerLabels {
    fn default() -> Self {
        Self {
            agent_label: "Agent".to_string(),
            agent_identity: None,
        }
    }
}

impl SpeakerLabels {
    fn resolve(&self, event: &ChatEvent) -> String {
        if let Some(name) = &event.sender_name {
            return name.clone();
        }
        match &event.sender {
            ParticipantId::Local => "You".to_string(),
            ParticipantId::Remote(identity) => {
                if self.agent_identity.as_deref() == Some(identity.as_str()) {
                    self.agent_label.clone()
                } else {
                    "Unknown".to_string()
                }
            }
        }
    }
}

/// The unified render record handed to presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub name: String,
    pub message: String,
    pub translation: Option<String>,
    pub summary: Option<String>,
    pub is_self: bool,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    pub fn from_message(message: &ReconciledMessage) -> Self {
        Self {
            name: message.speaker_name.clone(),
            message: message.display_text.clone(),
            translation: message.translation.clone(),
            summary: message.summary.clone(),
            is_self: message.is_self,
            timestamp: message.timestamp,
        }
    }

    pub fn from_chat(event: &ChatEvent, labels: &SpeakerLabels) -> Self {
        Self {
            name: labels.resolve(event),
            message: event.text.clone(),
            translation: None,
            summary: None,
            is_self: event.sender.is_local(),
            timestamp: event.timestamp,
        }
    }
}

/// Merge reconciled messages and chat events into one ordered timeline
///
/// Pure function, re-run in full on every update tick: both inputs are
/// projected, concatenated (messages first, then chat), and stable-sorted
/// by timestamp. Entries with equal timestamps keep their concatenation
/// order. Empty-message suppression is a render-time policy and does not
/// happen here.
pub fn assemble<'a, M>(
    messages: M,
    chat_events: &[ChatEvent],
    labels: &SpeakerLabels,
) -> Vec<ConversationEntry>
where
    M: IntoIterator<Item = &'a ReconciledMessage>,
{
    let mut entries: Vec<ConversationEntry> = messages
        .into_iter()
        .map(ConversationEntry::from_message)
        .collect();
    entries.extend(
        chat_events
            .iter()
            .map(|event| ConversationEntry::from_chat(event, labels)),
    );

    // Vec::sort_by_key is stable, which is the tie-order guarantee
    entries.sort_by_key(|entry| entry.timestamp);
    entries
}
