// Integration tests for segment reconciliation
//
// These tests verify the id-keyed upsert semantics: revisions never
// reorder a message, re-delivery is idempotent, and segment ids from
// different sources never collide.

use chrono::{DateTime, TimeZone, Utc};
use voicedesk::{
    assemble, ParticipantId, SegmentReconciler, SourceId, SpeakerLabels, TranscriptSegment,
};

fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

fn agent() -> ParticipantId {
    ParticipantId::Remote("agent-1".to_string())
}

#[test]
fn test_upsert_is_idempotent() {
    let mut reconciler = SegmentReconciler::new("Agent");
    let segment = TranscriptSegment::partial("s1", "hello wor");

    reconciler.upsert_at(SourceId::Agent, &segment, &agent(), at(100));
    let first = reconciler.get(SourceId::Agent, "s1").unwrap().clone();

    // re-deliver the identical segment several times, later
    for ms in [150, 200, 250] {
        reconciler.upsert_at(SourceId::Agent, &segment, &agent(), at(ms));
    }

    let after = reconciler.get(SourceId::Agent, "s1").unwrap();
    assert_eq!(after, &first);
    assert_eq!(after.timestamp, at(100));
    assert_eq!(after.speaker_name, "Agent");
    assert_eq!(reconciler.len(), 1);
}

#[test]
fn test_late_final_revision_does_not_reorder() {
    let mut reconciler = SegmentReconciler::new("Agent");

    // A first seen at t=100, B first seen at t=120,
    // then A's final revision arrives at t=150
    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::partial("a", "first utter"),
        &agent(),
        at(100),
    );
    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::partial("b", "second utter"),
        &agent(),
        at(120),
    );
    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::final_text("a", "first utterance, finished"),
        &agent(),
        at(150),
    );

    let entries = assemble(reconciler.messages(), &[], &SpeakerLabels::default());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "first utterance, finished");
    assert_eq!(entries[0].timestamp, at(100));
    assert_eq!(entries[1].message, "second utter ...");
}

#[test]
fn test_cross_source_ids_do_not_collide() {
    let mut reconciler = SegmentReconciler::new("Agent");

    // both sources reuse the small id "1"
    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::final_text("1", "agent says"),
        &agent(),
        at(10),
    );
    reconciler.upsert_at(
        SourceId::Local,
        &TranscriptSegment::final_text("1", "you say"),
        &ParticipantId::Local,
        at(20),
    );

    assert_eq!(reconciler.len(), 2);
    assert_eq!(
        reconciler.get(SourceId::Agent, "1").unwrap().display_text,
        "agent says"
    );
    assert_eq!(
        reconciler.get(SourceId::Local, "1").unwrap().display_text,
        "you say"
    );
    assert!(reconciler.get(SourceId::Local, "1").unwrap().is_self);
}

#[test]
fn test_snapshot_redelivery_reports_no_new_finals() {
    let mut reconciler = SegmentReconciler::new("Agent");
    let snapshot = vec![
        TranscriptSegment::final_text("s1", "done"),
        TranscriptSegment::partial("s2", "still goi"),
    ];

    let first = reconciler.apply_snapshot(SourceId::Agent, &snapshot, &agent());
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].segment_id, "s1");

    // the source re-sends its full current set
    let second = reconciler.apply_snapshot(SourceId::Agent, &snapshot, &agent());
    assert!(second.is_empty());

    // s2 finalizes in the next snapshot
    let final_snapshot = vec![
        TranscriptSegment::final_text("s1", "done"),
        TranscriptSegment::final_text("s2", "still going strong"),
    ];
    let third = reconciler.apply_snapshot(SourceId::Agent, &final_snapshot, &agent());
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].segment_id, "s2");
}

#[test]
fn test_clear_discards_everything() {
    let mut reconciler = SegmentReconciler::new("Agent");
    reconciler.upsert_at(
        SourceId::Agent,
        &TranscriptSegment::final_text("s1", "hello"),
        &agent(),
        at(10),
    );
    assert!(!reconciler.is_empty());

    reconciler.clear();
    assert!(reconciler.is_empty());
    assert!(reconciler.get(SourceId::Agent, "s1").is_none());
}
