//! Event emitter trait for UI-facing sync events.
//!
//! This module defines the abstraction for emitting [`SyncEvent`]s.
//! Implementations handle transport details (channels, IPC, SSE, etc.).

use tokio::sync::mpsc;

use crate::events::SyncEvent;

/// Trait for emitting sync events.
///
/// Typed feeds call `emit` once per delivery; the call must not block.
///
/// # Implementations
///
/// - [`NoopEmitter`] - For tests and headless contexts
/// - [`ChannelEmitter`] - Forwards events to an unbounded tokio channel
pub trait SyncEventEmitter: Send + Sync {
    /// Emit a sync event.
    fn emit(&self, event: SyncEvent);

    /// Clone this emitter into a boxed trait object.
    ///
    /// This enables cloning of `Arc<dyn SyncEventEmitter>` without requiring
    /// the underlying type to implement Clone.
    fn clone_box(&self) -> Box<dyn SyncEventEmitter>;
}

/// A no-op event emitter that discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl SyncEventEmitter for NoopEmitter {
    fn emit(&self, _event: SyncEvent) {}

    fn clone_box(&self) -> Box<dyn SyncEventEmitter> {
        Box::new(self.clone())
    }
}

/// Emitter that forwards events to an unbounded channel.
///
/// Events emitted after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SyncEventEmitter for ChannelEmitter {
    fn emit(&self, event: SyncEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Sync event receiver dropped");
        }
    }

    fn clone_box(&self) -> Box<dyn SyncEventEmitter> {
        Box::new(self.clone())
    }
}
