//! Speech capability port.
//!
//! Synthesis and playback live outside the sync core; the speech queue only
//! needs to know when an utterance has finished.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a speech capability.
#[derive(Debug, Error)]
pub enum SpeechPortError {
    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("Playback cancelled")]
    Cancelled,
}

/// An opaque text-to-speech capability.
#[async_trait]
pub trait SpeechPort: Send + Sync {
    /// Speak `text`, resolving once playback has completed.
    async fn speak(&self, text: &str) -> Result<(), SpeechPortError>;

    /// Stop whatever is playing. Only the user-facing voice toggle calls this.
    async fn cancel_all(&self);
}
