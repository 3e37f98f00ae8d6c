//! Console speech capability.
//!
//! Prints each announcement and holds the speaker for roughly the time it
//! would take to read aloud, so the queue's pacing is visible.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use tanksync_core::{SpeechPort, SpeechPortError};

const PER_WORD: Duration = Duration::from_millis(300);
const MAX_UTTERANCE: Duration = Duration::from_secs(20);

#[derive(Debug, Default)]
pub struct ConsoleSpeaker {
    cancel: Notify,
}

impl ConsoleSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    fn reading_time(text: &str) -> Duration {
        let words = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
        PER_WORD.saturating_mul(words).min(MAX_UTTERANCE)
    }
}

#[async_trait]
impl SpeechPort for ConsoleSpeaker {
    async fn speak(&self, text: &str) -> Result<(), SpeechPortError> {
        println!("🔊 {text}");
        tokio::select! {
            () = tokio::time::sleep(Self::reading_time(text)) => Ok(()),
            () = self.cancel.notified() => Err(SpeechPortError::Cancelled),
        }
    }

    async fn cancel_all(&self) {
        self.cancel.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_time_is_capped() {
        assert_eq!(ConsoleSpeaker::reading_time("three short words"), PER_WORD * 3);
        assert_eq!(ConsoleSpeaker::reading_time(&"w ".repeat(500)), MAX_UTTERANCE);
    }
}
