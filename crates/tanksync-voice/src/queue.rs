//! Speech queue — single global FIFO of announcements.
//!
//! Every client shares the spoken ledger, so an item is announced by at most
//! one client (modulo the accepted race between `was_spoken` and
//! `mark_spoken`). Within a process, a session set and an initial-load
//! counter keep a burst of startup deliveries from flooding the speaker.
//!
//! # Processing
//!
//! A worker task is spawned when the first item arrives on an idle queue and
//! exits when the queue drains. It speaks one utterance to completion, then
//! waits `pause` before the next. Disabling voice clears the pending items;
//! the utterance in flight always finishes.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc, watch};

use tanksync_core::{SpeechPort, SpokenLedgerPort, SyncSettings};

use crate::gate::WorkerGate;

// ── Queue state ────────────────────────────────────────────────────

/// What the worker is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueState {
    /// No worker running.
    Idle,

    /// An utterance is playing.
    Speaking,

    /// Between utterances.
    Pausing,
}

/// Why an item was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Voice output is switched off.
    Disabled,

    /// Some client already announced the item.
    AlreadySpoken,

    /// This process already queued the item.
    SpokenThisSession,

    /// The initial-load allowance for this session is used up.
    InitialLoadLimit,
}

/// Result of [`SpeechQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl EnqueueOutcome {
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

// ── Events emitted by the queue ────────────────────────────────────

/// Events emitted by the speech queue to the UI / application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    StateChanged(QueueState),

    Enqueued { item_id: String },

    Rejected { item_id: String, reason: RejectReason },

    SpeakingStarted { item_id: String },

    SpeakingFinished { item_id: String },

    /// The speech capability reported an error; the worker moves on.
    SpeakFailed { item_id: String, error: String },

    /// Pending items dropped because voice was disabled.
    Cleared { dropped: usize },
}

// ── Configuration ──────────────────────────────────────────────────

/// Configuration for the speech queue.
#[derive(Debug, Clone)]
pub struct SpeechQueueConfig {
    /// Silence between the end of one utterance and the start of the next.
    pub pause: Duration,

    /// Initial-load items accepted per session.
    pub initial_load_limit: usize,

    /// Whether voice output starts enabled.
    pub enabled: bool,
}

impl SpeechQueueConfig {
    pub const fn from_settings(settings: &SyncSettings) -> Self {
        Self {
            pause: settings.speech_pause(),
            initial_load_limit: settings.initial_load_announce_limit,
            enabled: settings.voice_enabled,
        }
    }
}

impl Default for SpeechQueueConfig {
    fn default() -> Self {
        Self::from_settings(&SyncSettings::default())
    }
}

// ── Speech queue ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Utterance {
    item_id: String,
    text: String,
}

/// Session bookkeeping, guarded together so check-and-insert is atomic.
#[derive(Default)]
struct Session {
    spoken: HashSet<String>,
    initial_count: usize,
}

struct Inner {
    config: SpeechQueueConfig,
    enabled: AtomicBool,
    pending: Mutex<VecDeque<Utterance>>,
    session: Mutex<Session>,
    gate: WorkerGate,
    state: watch::Sender<QueueState>,
    ledger: Arc<dyn SpokenLedgerPort>,
    speaker: Arc<dyn SpeechPort>,
    event_tx: mpsc::UnboundedSender<QueueEvent>,
}

/// The process-wide announcement queue. Clones share the same queue.
#[derive(Clone)]
pub struct SpeechQueue {
    inner: Arc<Inner>,
}

impl SpeechQueue {
    /// Create a new speech queue.
    ///
    /// Returns the queue and a receiver for [`QueueEvent`]s.
    #[must_use]
    pub fn new(
        config: SpeechQueueConfig,
        ledger: Arc<dyn SpokenLedgerPort>,
        speaker: Arc<dyn SpeechPort>,
    ) -> (Self, mpsc::UnboundedReceiver<QueueEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(QueueState::Idle);

        let queue = Self {
            inner: Arc::new(Inner {
                enabled: AtomicBool::new(config.enabled),
                config,
                pending: Mutex::new(VecDeque::new()),
                session: Mutex::new(Session::default()),
                gate: WorkerGate::new(),
                state,
                ledger,
                speaker,
                event_tx,
            }),
        };

        (queue, event_rx)
    }

    #[must_use]
    pub fn state(&self) -> QueueState {
        *self.inner.state.borrow()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    pub async fn pending_len(&self) -> usize {
        self.inner.pending.lock().await.len()
    }

    /// Queue `text` for announcement under `item_id`.
    ///
    /// `is_initial_load` marks items from a subscription's first delivery;
    /// only a few of those are accepted per session.
    pub async fn enqueue(
        &self,
        text: impl Into<String>,
        item_id: impl Into<String>,
        is_initial_load: bool,
    ) -> EnqueueOutcome {
        let item_id = item_id.into();

        let outcome = self.admit(&item_id, is_initial_load).await;
        if let EnqueueOutcome::Rejected(reason) = outcome {
            tracing::debug!(%item_id, ?reason, "Announcement rejected");
            self.emit(QueueEvent::Rejected { item_id, reason });
            return outcome;
        }

        {
            // Voice may have been switched off while the ledger was consulted
            let mut pending = self.inner.pending.lock().await;
            if !self.is_enabled() {
                drop(pending);
                self.forget(&item_id, is_initial_load).await;
                let reason = RejectReason::Disabled;
                tracing::debug!(%item_id, ?reason, "Announcement rejected");
                self.emit(QueueEvent::Rejected { item_id, reason });
                return EnqueueOutcome::Rejected(reason);
            }
            self.inner.ledger.mark_spoken(&item_id).await;
            pending.push_back(Utterance {
                item_id: item_id.clone(),
                text: text.into(),
            });
        }
        tracing::debug!(%item_id, "Announcement queued");
        self.emit(QueueEvent::Enqueued { item_id });

        self.kick();
        outcome
    }

    async fn admit(&self, item_id: &str, is_initial_load: bool) -> EnqueueOutcome {
        if !self.is_enabled() {
            return EnqueueOutcome::Rejected(RejectReason::Disabled);
        }
        if self.inner.ledger.was_spoken(item_id).await {
            return EnqueueOutcome::Rejected(RejectReason::AlreadySpoken);
        }

        let mut session = self.inner.session.lock().await;
        if session.spoken.contains(item_id) {
            return EnqueueOutcome::Rejected(RejectReason::SpokenThisSession);
        }
        if is_initial_load {
            if session.initial_count >= self.inner.config.initial_load_limit {
                return EnqueueOutcome::Rejected(RejectReason::InitialLoadLimit);
            }
            session.initial_count += 1;
        }
        session.spoken.insert(item_id.to_string());
        EnqueueOutcome::Accepted
    }

    /// Undo the session bookkeeping of an item admitted but never queued.
    async fn forget(&self, item_id: &str, is_initial_load: bool) {
        let mut session = self.inner.session.lock().await;
        session.spoken.remove(item_id);
        if is_initial_load {
            session.initial_count = session.initial_count.saturating_sub(1);
        }
    }

    /// Switch voice output on or off. Switching off drops pending items and
    /// returns how many; the utterance in flight is left to finish.
    pub async fn set_enabled(&self, enabled: bool) -> usize {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
        tracing::info!(enabled, "Voice output toggled");

        if enabled {
            self.kick();
            return 0;
        }

        let dropped = {
            let mut pending = self.inner.pending.lock().await;
            let dropped = pending.len();
            pending.clear();
            dropped
        };
        if dropped > 0 {
            tracing::debug!(dropped, "Cleared pending announcements");
            self.emit(QueueEvent::Cleared { dropped });
        }
        dropped
    }

    /// Resolve once no worker is running.
    pub async fn wait_idle(&self) {
        let mut state = self.inner.state.subscribe();
        let gate = &self.inner.gate;
        // The sender lives in `inner`, so the channel cannot close here
        let _ = state.wait_for(|_| !gate.is_busy()).await;
    }

    /// Start a worker unless one is already running.
    fn kick(&self) {
        if !self.inner.gate.try_acquire() {
            return;
        }
        let queue = self.clone();
        tokio::spawn(async move { queue.run_worker().await });
    }

    async fn run_worker(self) {
        loop {
            let next = if self.is_enabled() {
                self.inner.pending.lock().await.pop_front()
            } else {
                None
            };

            let Some(utterance) = next else {
                self.inner.gate.release();
                // An item may have arrived between the pop and the release
                if self.is_enabled()
                    && !self.inner.pending.lock().await.is_empty()
                    && self.inner.gate.try_acquire()
                {
                    continue;
                }
                self.settle_idle();
                return;
            };

            self.speak(utterance).await;

            self.set_state(QueueState::Pausing);
            tokio::time::sleep(self.inner.config.pause).await;
        }
    }

    async fn speak(&self, utterance: Utterance) {
        let Utterance { item_id, text } = utterance;

        self.set_state(QueueState::Speaking);
        self.emit(QueueEvent::SpeakingStarted {
            item_id: item_id.clone(),
        });

        match self.inner.speaker.speak(&text).await {
            Ok(()) => self.emit(QueueEvent::SpeakingFinished { item_id }),
            Err(e) => {
                tracing::warn!(%item_id, error = %e, "Speech failed");
                self.emit(QueueEvent::SpeakFailed {
                    item_id,
                    error: e.to_string(),
                });
            }
        }
    }

    fn set_state(&self, state: QueueState) {
        let previous = self.inner.state.send_replace(state);
        if previous != state {
            tracing::debug!(?state, "Speech queue state");
            self.emit(QueueEvent::StateChanged(state));
        }
    }

    /// Publish `Idle` unless another worker already holds the gate.
    ///
    /// The check runs under the state channel's lock, and a new worker
    /// acquires the gate before it publishes `Speaking`, so a stale worker
    /// can never overwrite it.
    fn settle_idle(&self) {
        let gate = &self.inner.gate;
        let mut changed = false;
        self.inner.state.send_if_modified(|state| {
            if gate.is_busy() {
                return false;
            }
            changed = *state != QueueState::Idle;
            *state = QueueState::Idle;
            true
        });
        if changed {
            tracing::debug!(state = ?QueueState::Idle, "Speech queue state");
            self.emit(QueueEvent::StateChanged(QueueState::Idle));
        }
    }

    fn emit(&self, event: QueueEvent) {
        // Receiver dropped means nobody is listening
        let _ = self.inner.event_tx.send(event);
    }
}

impl std::fmt::Debug for SpeechQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechQueue")
            .field("state", &self.state())
            .field("enabled", &self.is_enabled())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tanksync_core::SpeechPortError;

    #[derive(Default)]
    struct MemoryLedger {
        spoken: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl SpokenLedgerPort for MemoryLedger {
        async fn was_spoken(&self, id: &str) -> bool {
            self.spoken.lock().await.contains(id)
        }

        async fn mark_spoken(&self, id: &str) {
            self.spoken.lock().await.insert(id.to_string());
        }
    }

    #[derive(Default)]
    struct SilentSpeaker {
        spoken: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechPort for SilentSpeaker {
        async fn speak(&self, text: &str) -> Result<(), SpeechPortError> {
            self.spoken.lock().await.push(text.to_string());
            Ok(())
        }

        async fn cancel_all(&self) {}
    }

    fn queue() -> (SpeechQueue, Arc<MemoryLedger>, Arc<SilentSpeaker>) {
        let ledger = Arc::new(MemoryLedger::default());
        let speaker = Arc::new(SilentSpeaker::default());
        let (queue, _events) = SpeechQueue::new(
            SpeechQueueConfig::default(),
            Arc::clone(&ledger) as Arc<dyn SpokenLedgerPort>,
            Arc::clone(&speaker) as Arc<dyn SpeechPort>,
        );
        (queue, ledger, speaker)
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_items_are_marked_and_spoken() {
        let (queue, ledger, speaker) = queue();

        assert!(queue.enqueue("hello", "n1", false).await.is_accepted());
        queue.wait_idle().await;

        assert!(ledger.was_spoken("n1").await);
        assert_eq!(*speaker.spoken.lock().await, vec!["hello"]);
        assert_eq!(queue.state(), QueueState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn ledger_hit_is_rejected() {
        let (queue, ledger, _) = queue();
        ledger.mark_spoken("n1").await;

        assert_eq!(
            queue.enqueue("hello", "n1", false).await,
            EnqueueOutcome::Rejected(RejectReason::AlreadySpoken)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn session_set_rejects_repeats_when_ledger_forgets() {
        let (queue, ledger, _) = queue();
        queue.enqueue("hello", "n1", false).await;
        ledger.spoken.lock().await.clear();

        assert_eq!(
            queue.enqueue("hello", "n1", false).await,
            EnqueueOutcome::Rejected(RejectReason::SpokenThisSession)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_queue_rejects_without_marking() {
        let (queue, ledger, _) = queue();
        queue.set_enabled(false).await;

        assert_eq!(
            queue.enqueue("hello", "n1", false).await,
            EnqueueOutcome::Rejected(RejectReason::Disabled)
        );
        assert!(!ledger.was_spoken("n1").await);
    }

    /// Ledger whose `was_spoken` waits until the test lets it answer.
    #[derive(Default)]
    struct StallingLedger {
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
        inner: MemoryLedger,
    }

    #[async_trait]
    impl SpokenLedgerPort for StallingLedger {
        async fn was_spoken(&self, id: &str) -> bool {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.was_spoken(id).await
        }

        async fn mark_spoken(&self, id: &str) {
            self.inner.mark_spoken(id).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_during_ledger_check_rejects_the_item() {
        let ledger = Arc::new(StallingLedger::default());
        let speaker = Arc::new(SilentSpeaker::default());
        let (queue, _events) = SpeechQueue::new(
            SpeechQueueConfig::default(),
            Arc::clone(&ledger) as Arc<dyn SpokenLedgerPort>,
            Arc::clone(&speaker) as Arc<dyn SpeechPort>,
        );

        let pending = tokio::spawn({
            let queue = queue.clone();
            async move { queue.enqueue("stale", "n1", true).await }
        });
        ledger.entered.notified().await;
        assert_eq!(queue.set_enabled(false).await, 0);
        ledger.release.notify_one();

        assert_eq!(
            pending.await.unwrap(),
            EnqueueOutcome::Rejected(RejectReason::Disabled)
        );
        assert_eq!(queue.pending_len().await, 0);
        assert!(!ledger.inner.spoken.lock().await.contains("n1"));
        {
            let session = queue.inner.session.lock().await;
            assert!(!session.spoken.contains("n1"));
            assert_eq!(session.initial_count, 0);
        }

        queue.set_enabled(true).await;
        queue.wait_idle().await;
        assert!(speaker.spoken.lock().await.is_empty());
    }

    #[tokio::test]
    async fn stale_worker_does_not_overwrite_a_running_worker() {
        let (queue, _, _) = queue();

        assert!(queue.inner.gate.try_acquire());
        queue.set_state(QueueState::Speaking);
        queue.settle_idle();
        assert_eq!(queue.state(), QueueState::Speaking);

        queue.inner.gate.release();
        queue.settle_idle();
        assert_eq!(queue.state(), QueueState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn events_report_the_lifecycle() {
        let ledger = Arc::new(MemoryLedger::default());
        let speaker = Arc::new(SilentSpeaker::default());
        let (queue, mut events) = SpeechQueue::new(SpeechQueueConfig::default(), ledger, speaker);

        queue.enqueue("hello", "n1", false).await;
        queue.wait_idle().await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen[0], QueueEvent::Enqueued { item_id: "n1".into() });
        assert!(seen.contains(&QueueEvent::SpeakingFinished { item_id: "n1".into() }));
        assert_eq!(seen.last(), Some(&QueueEvent::StateChanged(QueueState::Idle)));
    }
}
