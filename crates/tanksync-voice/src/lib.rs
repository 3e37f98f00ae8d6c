//! Announcement queue for tanksync.
//!
//! Deliveries from the shared news and knowledge feeds are turned into
//! spoken announcements: [`Announcer`] offers items, [`SpeechQueue`] filters
//! them against the shared spoken ledger and plays them one at a time
//! through a [`SpeechPort`](tanksync_core::SpeechPort), and
//! [`VoiceService`] is the on/off switch.

pub mod announcer;
pub mod gate;
pub mod queue;
pub mod service;
pub mod text_utils;

pub use announcer::{Announceable, Announcer};
pub use gate::WorkerGate;
pub use queue::{
    EnqueueOutcome, QueueEvent, QueueState, RejectReason, SpeechQueue, SpeechQueueConfig,
};
pub use service::{VoiceService, VoiceStatus};
pub use text_utils::prepare_announcement;
