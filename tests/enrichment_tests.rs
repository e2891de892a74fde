// Integration tests for the enrichment pipeline
//
// These tests verify the extraction contract: at most one run per
// finalized segment id, at most one outstanding run at a time, silent
// failure, stale-generation drops, and idempotent field sinks.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Duration;
use voicedesk::{
    Enrichment, EnrichmentPipeline, FieldExtractor, FieldKind, FieldUpdate, MessageKey,
    SessionFields, SourceId,
};

/// Extractor that counts invocations and returns a fixed detection
struct CountingExtractor {
    calls: Arc<AtomicUsize>,
    delay: Duration,
    fields: Vec<FieldUpdate>,
}

#[async_trait]
impl FieldExtractor for CountingExtractor {
    async fn extract(&self, _text: &str, _known: &SessionFields) -> Result<Enrichment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Enrichment {
            translation: None,
            summary: None,
            fields: self.fields.clone(),
        })
    }
}

/// Extractor that always fails
struct FailingExtractor;

#[async_trait]
impl FieldExtractor for FailingExtractor {
    async fn extract(&self, _text: &str, _known: &SessionFields) -> Result<Enrichment> {
        anyhow::bail!("no recognizable entity")
    }
}

fn key(id: &str) -> MessageKey {
    MessageKey::new(SourceId::Agent, id)
}

#[tokio::test]
async fn test_extraction_runs_at_most_once_per_id() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let extractor = Arc::new(CountingExtractor {
        calls: Arc::clone(&calls),
        delay: Duration::from_millis(20),
        fields: vec![FieldUpdate::new(FieldKind::ClientName, "Sara Haddad")],
    });
    let (mut pipeline, mut results) = EnrichmentPipeline::new(extractor);

    pipeline.request(key("s1"), "my name is Sara Haddad".into(), SessionFields::default());
    // second attempt while the first is still in flight
    pipeline.request(key("s1"), "my name is Sara Haddad".into(), SessionFields::default());

    let result = results.recv().await.expect("result");
    let updates = pipeline.settle(&result).expect("current generation");
    assert_eq!(updates.len(), 1);

    // re-delivery of the unchanged finalized text after completion
    pipeline.request(key("s1"), "my name is Sara Haddad".into(), SessionFields::default());

    // give a would-be extra task time to run
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_repeated_identical_detection_is_deduplicated() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let extractor = Arc::new(CountingExtractor {
        calls,
        delay: Duration::ZERO,
        fields: vec![FieldUpdate::new(FieldKind::Emergency, "fire")],
    });
    let (mut pipeline, mut results) = EnrichmentPipeline::new(extractor);

    // two different finalized segments detect the same value
    pipeline.request(key("s1"), "there is a fire".into(), SessionFields::default());
    pipeline.request(key("s2"), "the fire is spreading".into(), SessionFields::default());

    let first = results.recv().await.expect("first result");
    let second = results.recv().await.expect("second result");

    let first_updates = pipeline.settle(&first).expect("current generation");
    let second_updates = pipeline.settle(&second).expect("current generation");

    // only one of them actually fires the sink
    assert_eq!(first_updates.len() + second_updates.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failure_is_silent_and_never_retried() -> Result<()> {
    let (mut pipeline, mut results) = EnrichmentPipeline::new(Arc::new(FailingExtractor));

    pipeline.request(key("s1"), "unparseable".into(), SessionFields::default());

    // failure still settles the id, with nothing detected
    let result = results.recv().await.expect("result");
    assert!(result.enrichment.is_empty());
    let updates = pipeline.settle(&result).expect("current generation");
    assert!(updates.is_empty());

    // the id is done; no retry is started
    pipeline.request(key("s1"), "unparseable".into(), SessionFields::default());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(results.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn test_stale_generation_results_are_dropped() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let extractor = Arc::new(CountingExtractor {
        calls,
        delay: Duration::from_millis(30),
        fields: vec![FieldUpdate::new(FieldKind::Address, "14 Palm Street")],
    });
    let (mut pipeline, mut results) = EnrichmentPipeline::new(extractor);

    pipeline.request(key("s1"), "i live at 14 Palm Street".into(), SessionFields::default());

    // the session disconnects while extraction is in flight
    pipeline.reset();

    let late = results.recv().await.expect("late result");
    assert!(pipeline.settle(&late).is_none());
    Ok(())
}

#[tokio::test]
async fn test_reset_allows_same_id_in_new_session() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let extractor = Arc::new(CountingExtractor {
        calls: Arc::clone(&calls),
        delay: Duration::ZERO,
        fields: vec![],
    });
    let (mut pipeline, mut results) = EnrichmentPipeline::new(extractor);

    pipeline.request(key("s1"), "hello".into(), SessionFields::default());
    let result = results.recv().await.expect("result");
    pipeline.settle(&result);

    pipeline.reset();

    // a fresh session may legitimately reuse segment ids
    pipeline.request(key("s1"), "hello again".into(), SessionFields::default());
    let result = results.recv().await.expect("result after reset");
    assert!(pipeline.settle(&result).is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
}
