use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::enrichment::{
    EnrichmentPipeline, EnrichmentResult, FieldExtractor, FieldUpdate, SessionFields,
};
use crate::transcript::{
    assemble, ChatEvent, ConversationEntry, ParticipantId, SegmentReconciler, SourceId,
    SpeakerLabels, TranscriptSegment,
};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A snapshot stream of transcription segments for one audio track
///
/// Each notification carries the source's current full segment set, not
/// a diff; the reconciler upserts over all of them every time.
pub struct SegmentFeed {
    pub source: SourceId,
    pub speaker: ParticipantId,
    pub segments: watch::Receiver<Vec<TranscriptSegment>>,
}

impl SegmentFeed {
    pub fn new(
        source: SourceId,
        speaker: ParticipantId,
    ) -> (watch::Sender<Vec<TranscriptSegment>>, Self) {
        let (tx, rx) = watch::channel(Vec::new());
        (
            tx,
            Self {
                source,
                speaker,
                segments: rx,
            },
        )
    }
}

/// A snapshot stream of the session's chat history (append-only upstream)
pub struct ChatFeed {
    pub events: watch::Receiver<Vec<ChatEvent>>,
}

impl ChatFeed {
    pub fn new() -> (watch::Sender<Vec<ChatEvent>>, Self) {
        let (tx, rx) = watch::channel(Vec::new());
        (tx, Self { events: rx })
    }
}

/// State owned by the single writer context
struct Inner {
    reconciler: SegmentReconciler,
    chat: Vec<ChatEvent>,
    fields: SessionFields,
    pipeline: EnrichmentPipeline,
}

/// A live conversation session
///
/// One task ingests both segment feeds, the chat feed, and completed
/// enrichment results, processing each event to completion before the
/// next; there is no second writer. Readers pull snapshots (`timeline`,
/// `fields`) at their own pace.
pub struct ConversationSession {
    config: SessionConfig,
    labels: SpeakerLabels,
    started_at: chrono::DateTime<Utc>,
    inner: Arc<Mutex<Inner>>,

    /// Outbound chat send capability, forwarded upward to presentation
    outbound_tx: mpsc::Sender<String>,
    outbound_rx: Mutex<Option<mpsc::Receiver<String>>>,

    /// Detected-field updates for reactive consumers
    field_updates_tx: broadcast::Sender<FieldUpdate>,

    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConversationSession {
    /// Create the session and spawn its ingestion loop
    pub fn start(
        config: SessionConfig,
        agent_feed: SegmentFeed,
        local_feed: SegmentFeed,
        chat_feed: ChatFeed,
        extractor: Arc<dyn FieldExtractor>,
    ) -> Self {
        info!("Starting conversation session: {}", config.session_id);

        let labels = SpeakerLabels {
            agent_label: config.agent_label.clone(),
            agent_identity: config.agent_identity.clone(),
        };

        let (pipeline, results_rx) = EnrichmentPipeline::new(extractor);
        let inner = Arc::new(Mutex::new(Inner {
            reconciler: SegmentReconciler::new(config.agent_label.clone()),
            chat: Vec::new(),
            fields: SessionFields::default(),
            pipeline,
        }));

        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_capacity);
        let (field_updates_tx, _) = broadcast::channel(64);
        let shutdown = Arc::new(Notify::new());
        let running = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(run_loop(
            Arc::clone(&inner),
            agent_feed,
            local_feed,
            chat_feed,
            results_rx,
            field_updates_tx.clone(),
            Arc::clone(&shutdown),
            Arc::clone(&running),
        ));

        Self {
            config,
            labels,
            started_at: Utc::now(),
            inner,
            outbound_tx,
            outbound_rx: Mutex::new(Some(outbound_rx)),
            field_updates_tx,
            shutdown,
            running,
            task: Mutex::new(Some(task)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Assembled conversation log, ordered by first-sight timestamp
    pub async fn timeline(&self) -> Vec<ConversationEntry> {
        let inner = self.inner.lock().await;
        assemble(inner.reconciler.messages(), &inner.chat, &self.labels)
    }

    /// Current detected session fields
    pub async fn fields(&self) -> SessionFields {
        self.inner.lock().await.fields.clone()
    }

    /// Send sink for outbound chat; the core never originates messages
    pub fn chat_sender(&self) -> mpsc::Sender<String> {
        self.outbound_tx.clone()
    }

    /// Hand the outbound receiver to the transport adapter (once)
    pub async fn take_outbound(&self) -> Option<mpsc::Receiver<String>> {
        self.outbound_rx.lock().await.take()
    }

    /// Subscribe to detected-field updates
    pub fn field_updates(&self) -> broadcast::Receiver<FieldUpdate> {
        self.field_updates_tx.subscribe()
    }

    /// Discard all per-session state and orphan in-flight enrichment
    ///
    /// Used on disconnect/reconnect: the mapping, chat log, and all four
    /// detected fields are cleared, and any enrichment result that
    /// arrives later fails the generation check and is dropped.
    pub async fn reset(&self) {
        info!("Resetting session state: {}", self.config.session_id);
        let mut inner = self.inner.lock().await;
        inner.reconciler.clear();
        inner.chat.clear();
        inner.fields.reset();
        inner.pipeline.reset();
    }

    /// Get current session statistics
    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);
        let inner = self.inner.lock().await;

        SessionStats {
            session_id: self.config.session_id.clone(),
            is_running: self.running.load(Ordering::SeqCst),
            started_at: self.started_at,
            uptime_secs: duration.num_milliseconds() as f64 / 1000.0,
            transcript_message_count: inner.reconciler.len(),
            chat_event_count: inner.chat.len(),
        }
    }

    /// Stop the session: tear down the loop and discard all state
    pub async fn stop(&self) -> SessionStats {
        info!("Stopping conversation session: {}", self.config.session_id);

        let stats = self.stats().await;

        self.shutdown.notify_one();
        {
            let mut handle = self.task.lock().await;
            if let Some(task) = handle.take() {
                if let Err(e) = task.await {
                    error!("Session loop panicked: {}", e);
                }
            }
        }
        self.running.store(false, Ordering::SeqCst);

        self.reset().await;

        info!("Conversation session stopped: {}", self.config.session_id);
        stats
    }
}

/// Ingest one segment snapshot and kick enrichment for agent finals
async fn ingest_segments(
    inner: &Arc<Mutex<Inner>>,
    source: SourceId,
    speaker: &ParticipantId,
    snapshot: Vec<TranscriptSegment>,
) {
    let mut inner = inner.lock().await;
    let newly_final = inner.reconciler.apply_snapshot(source, &snapshot, speaker);

    // only finalized agent speech is enriched
    if speaker.is_local() {
        return;
    }
    for key in newly_final {
        let Some(message) = inner.reconciler.get_by_key(&key) else {
            continue;
        };
        let text = message.display_text.clone();
        let known = inner.fields.clone();
        inner.pipeline.request(key, text, known);
    }
}

/// Apply one completed enrichment on the writer context
async fn settle_enrichment(
    inner: &Arc<Mutex<Inner>>,
    field_updates_tx: &broadcast::Sender<FieldUpdate>,
    result: EnrichmentResult,
) {
    let mut inner = inner.lock().await;
    let Some(updates) = inner.pipeline.settle(&result) else {
        return; // stale generation, session was reset meanwhile
    };

    inner.reconciler.set_enrichment(
        &result.key,
        result.enrichment.translation.as_deref(),
        result.enrichment.summary.as_deref(),
    );
    for update in updates {
        inner.fields.apply(&update);
        // no subscribers is fine
        let _ = field_updates_tx.send(update);
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_loop(
    inner: Arc<Mutex<Inner>>,
    mut agent_feed: SegmentFeed,
    mut local_feed: SegmentFeed,
    mut chat_feed: ChatFeed,
    mut results_rx: mpsc::UnboundedReceiver<EnrichmentResult>,
    field_updates_tx: broadcast::Sender<FieldUpdate>,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
) {
    info!("Conversation ingestion loop started");

    let mut agent_open = true;
    let mut local_open = true;
    let mut chat_open = true;

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                break;
            }

            changed = agent_feed.segments.changed(), if agent_open => {
                match changed {
                    Ok(()) => {
                        let snapshot = agent_feed.segments.borrow_and_update().clone();
                        ingest_segments(&inner, agent_feed.source, &agent_feed.speaker, snapshot)
                            .await;
                    }
                    Err(_) => agent_open = false,
                }
            }

            changed = local_feed.segments.changed(), if local_open => {
                match changed {
                    Ok(()) => {
                        let snapshot = local_feed.segments.borrow_and_update().clone();
                        ingest_segments(&inner, local_feed.source, &local_feed.speaker, snapshot)
                            .await;
                    }
                    Err(_) => local_open = false,
                }
            }

            changed = chat_feed.events.changed(), if chat_open => {
                match changed {
                    Ok(()) => {
                        let snapshot = chat_feed.events.borrow_and_update().clone();
                        let mut inner = inner.lock().await;
                        inner.chat = snapshot;
                    }
                    Err(_) => chat_open = false,
                }
            }

            result = results_rx.recv() => {
                if let Some(result) = result {
                    settle_enrichment(&inner, &field_updates_tx, result).await;
                }
            }
        }

        if !agent_open && !local_open && !chat_open {
            // all sources gone; nothing left to ingest
            break;
        }
    }

    running.store(false, Ordering::SeqCst);
    info!("Conversation ingestion loop stopped");
}
