use super::extractor::{Enrichment, FieldExtractor};
use super::fields::{FieldKind, FieldUpdate, SessionFields};
use crate::transcript::MessageKey;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Completed extraction for one finalized segment
#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    /// Session generation the request was issued under
    pub generation: u64,
    pub key: MessageKey,
    pub enrichment: Enrichment,
}

/// Drives best-effort extraction over finalized agent utterances
///
/// Guarantees, per finalized segment id:
/// - extraction runs at most once (full-snapshot re-delivery is a no-op)
/// - at most one extraction is outstanding at a time
/// - the reconciler never blocks on extraction; results come back on a
///   channel and are settled on the session's writer context
///
/// Results carry the session generation they were requested under, so
/// anything that completes after a reset is discarded unseen.
pub struct EnrichmentPipeline {
    extractor: Arc<dyn FieldExtractor>,
    results_tx: mpsc::UnboundedSender<EnrichmentResult>,
    generation: u64,
    completed: HashSet<MessageKey>,
    in_flight: HashSet<MessageKey>,
    /// Last value emitted per field, to keep the sinks idempotent
    reported: HashMap<FieldKind, String>,
}

impl EnrichmentPipeline {
    pub fn new(
        extractor: Arc<dyn FieldExtractor>,
    ) -> (Self, mpsc::UnboundedReceiver<EnrichmentResult>) {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        (
            Self {
                extractor,
                results_tx,
                generation: 0,
                completed: HashSet::new(),
                in_flight: HashSet::new(),
                reported: HashMap::new(),
            },
            results_rx,
        )
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Kick off extraction for a newly finalized segment
    ///
    /// Skipped when the id was already enriched or has an extraction in
    /// flight. The spawned task always reports back, sending an empty
    /// enrichment on extraction failure so the id is marked done and
    /// never retried.
    pub fn request(&mut self, key: MessageKey, text: String, known: SessionFields) {
        if self.completed.contains(&key) || self.in_flight.contains(&key) {
            return;
        }
        self.in_flight.insert(key.clone());

        let extractor = Arc::clone(&self.extractor);
        let results_tx = self.results_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let enrichment = match extractor.extract(&text, &known).await {
                Ok(enrichment) => enrichment,
                Err(e) => {
                    // best effort: swallow and mark the id as done
                    debug!(segment_id = %key.segment_id, "enrichment failed: {e:#}");
                    Enrichment::default()
                }
            };
            // receiver gone means the session is torn down
            let _ = results_tx.send(EnrichmentResult {
                generation,
                key,
                enrichment,
            });
        });
    }

    /// Settle a completed extraction on the writer context
    ///
    /// Returns `None` for results from a stale generation (the session
    /// was reset while the extraction was in flight). Otherwise returns
    /// the field updates that actually changed a value, deduplicated so
    /// repeated identical detections never re-fire a sink.
    pub fn settle(&mut self, result: &EnrichmentResult) -> Option<Vec<FieldUpdate>> {
        if result.generation != self.generation {
            debug!(
                segment_id = %result.key.segment_id,
                "dropping enrichment result from stale generation"
            );
            return None;
        }

        self.in_flight.remove(&result.key);
        self.completed.insert(result.key.clone());

        let mut updates = Vec::new();
        for update in &result.enrichment.fields {
            if self.reported.get(&update.kind) == Some(&update.value) {
                continue;
            }
            self.reported.insert(update.kind, update.value.clone());
            updates.push(update.clone());
        }
        Some(updates)
    }

    /// Start a new generation, orphaning everything in flight
    pub fn reset(&mut self) {
        self.generation += 1;
        self.completed.clear();
        self.in_flight.clear();
        self.reported.clear();
    }
}
