// Integration tests for timeline assembly
//
// These tests verify that reconciled transcript messages and chat events
// merge into one deterministic, timestamp-ordered conversation log.

use chrono::{DateTime, TimeZone, Utc};
use voicedesk::{
    assemble, ChatEvent, ParticipantId, SegmentReconciler, SourceId, SpeakerLabels,
    TranscriptSegment,
};

fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

fn chat(sender: ParticipantId, text: &str, ms: i64) -> ChatEvent {
    ChatEvent {
        sender,
        sender_name: None,
        text: text.to_string(),
        timestamp: at(ms),
    }
}

#[test]
fn test_chat_before_segment_when_earlier() {
    let mut reconciler = SegmentReconciler::new("Agent");
    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::final_text("s1", "spoken at 100"),
        &ParticipantId::Remote("agent-1".into()),
        at(100),
    );

    let chat_events = vec![chat(ParticipantId::Local, "typed at 90", 90)];
    let entries = assemble(reconciler.messages(), &chat_events, &SpeakerLabels::default());

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "typed at 90");
    assert_eq!(entries[1].message, "spoken at 100");
}

#[test]
fn test_assembly_is_pure_and_rerunnable() {
    let mut reconciler = SegmentReconciler::new("Agent");
    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::partial("s1", "partial tex"),
        &ParticipantId::Remote("agent-1".into()),
        at(50),
    );
    let chat_events = vec![chat(ParticipantId::Local, "hi", 40)];
    let labels = SpeakerLabels::default();

    let first = assemble(reconciler.messages(), &chat_events, &labels);
    let second = assemble(reconciler.messages(), &chat_events, &labels);

    assert_eq!(first, second);
    assert_eq!(chat_events.len(), 1); // inputs untouched
}

#[test]
fn test_empty_messages_survive_assembly() {
    // empty-message suppression is a render-time policy, not ours
    let reconciler = SegmentReconciler::new("Agent");
    let chat_events = vec![chat(ParticipantId::Local, "", 10)];

    let entries = assemble(reconciler.messages(), &chat_events, &SpeakerLabels::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "");
}

#[test]
fn test_end_to_end_ordering_scenario() {
    let mut reconciler = SegmentReconciler::new("Agent");
    let agent = ParticipantId::Remote("agent-1".to_string());

    // agent segment "s1": partial at t=10, revised final at t=12
    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::partial("s1", "Hel"),
        &agent,
        at(10),
    );

    // progressive render shows the in-progress marker
    let progressive = assemble(reconciler.messages(), &[], &SpeakerLabels::default());
    assert_eq!(progressive[0].message, "Hel ...");

    // local segment with the same id "s1" on a different source, final at t=11
    reconciler.upsert_at(
        SourceId::Local,
        &TranscriptSegment::final_text("s1", "Hi"),
        &ParticipantId::Local,
        at(11),
    );

    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::final_text("s1", "Hello there"),
        &agent,
        at(12),
    );

    // chat event from the local participant at t=20
    let chat_events = vec![chat(ParticipantId::Local, "brb", 20)];

    let entries = assemble(reconciler.messages(), &chat_events, &SpeakerLabels::default());
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].message, "Hello there");
    assert_eq!(entries[0].timestamp, at(10)); // first-sight time, not revision time
    assert!(!entries[0].is_self);

    assert_eq!(entries[1].message, "Hi");
    assert_eq!(entries[1].name, "You");
    assert!(entries[1].is_self);

    assert_eq!(entries[2].message, "brb");
    assert!(entries[2].is_self);
}
