//! `VoiceService` — the user-facing voice toggle.
//!
//! Owns the speech queue and the speech capability. Switching voice off
//! clears the queue and then asks the capability to stop what is playing;
//! nothing else ever interrupts an utterance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use tanksync_core::{SpeechPort, SpokenLedgerPort, SyncContext};

use crate::announcer::Announcer;
use crate::queue::{QueueEvent, QueueState, SpeechQueue, SpeechQueueConfig};

/// Snapshot of the voice state for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceStatus {
    pub enabled: bool,
    pub state: QueueState,
    pub pending: usize,
}

pub struct VoiceService {
    queue: SpeechQueue,
    speaker: Arc<dyn SpeechPort>,
}

impl VoiceService {
    /// Create a voice service over its own speech queue.
    #[must_use]
    pub fn new(
        config: SpeechQueueConfig,
        ledger: Arc<dyn SpokenLedgerPort>,
        speaker: Arc<dyn SpeechPort>,
    ) -> (Self, mpsc::UnboundedReceiver<QueueEvent>) {
        let (queue, events) = SpeechQueue::new(config, ledger, Arc::clone(&speaker));
        (Self { queue, speaker }, events)
    }

    /// Wire a voice service to a sync context's settings and spoken ledger.
    #[must_use]
    pub fn from_context(
        ctx: &SyncContext,
        speaker: Arc<dyn SpeechPort>,
    ) -> (Self, mpsc::UnboundedReceiver<QueueEvent>) {
        Self::new(
            SpeechQueueConfig::from_settings(ctx.settings()),
            ctx.ledger(),
            speaker,
        )
    }

    pub const fn queue(&self) -> &SpeechQueue {
        &self.queue
    }

    /// An announcer feeding this service's queue.
    pub fn announcer(&self) -> Announcer {
        Announcer::new(self.queue.clone())
    }

    /// Toggle voice output. Returns how many pending items were dropped.
    pub async fn set_enabled(&self, enabled: bool) -> usize {
        let dropped = self.queue.set_enabled(enabled).await;
        if !enabled {
            self.speaker.cancel_all().await;
        }
        dropped
    }

    pub async fn status(&self) -> VoiceStatus {
        VoiceStatus {
            enabled: self.queue.is_enabled(),
            state: self.queue.state(),
            pending: self.queue.pending_len().await,
        }
    }
}

impl std::fmt::Debug for VoiceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceService")
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tanksync_core::SpeechPortError;

    struct NullLedger;

    #[async_trait]
    impl SpokenLedgerPort for NullLedger {
        async fn was_spoken(&self, _id: &str) -> bool {
            false
        }

        async fn mark_spoken(&self, _id: &str) {}
    }

    #[derive(Default)]
    struct CountingSpeaker {
        cancels: AtomicUsize,
    }

    #[async_trait]
    impl SpeechPort for CountingSpeaker {
        async fn speak(&self, _text: &str) -> Result<(), SpeechPortError> {
            Ok(())
        }

        async fn cancel_all(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn disabling_cancels_playback() {
        let speaker = Arc::new(CountingSpeaker::default());
        let (service, _events) = VoiceService::new(
            SpeechQueueConfig::default(),
            Arc::new(NullLedger),
            Arc::clone(&speaker) as Arc<dyn SpeechPort>,
        );

        service.set_enabled(false).await;
        assert_eq!(speaker.cancels.load(Ordering::SeqCst), 1);
        assert!(!service.status().await.enabled);

        service.set_enabled(true).await;
        assert_eq!(speaker.cancels.load(Ordering::SeqCst), 1);
        assert_eq!(service.status().await.state, QueueState::Idle);
    }
}
