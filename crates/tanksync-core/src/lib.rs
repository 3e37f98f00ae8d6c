//! Core of the tanksync multi-writer sync layer.
//!
//! Domain records, the collection catalogue, store and speech ports, the
//! change demultiplexer and the services built on them. Concrete stores live
//! in `tanksync-db`; the speech queue lives in `tanksync-voice`.

pub mod clock;
pub mod collections;
pub mod demux;
pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;
pub mod subscription;

pub use clock::{MonotonicClock, wall_clock_ms};
pub use collections::{
    Collection, CollectionKind, SINGLETON_KEY, STATUS_SCALAR_KEYS, UnknownCollection, WritePolicy,
};
pub use demux::{ChangeDemultiplexer, ChangeSet, DemuxState, Delivery};
pub use domain::{
    KnowledgeItem, KnowledgeType, MarketSnapshot, NewsItem, Record, Remark, SpokenMarker,
    StatusRecord, TokenQuote, WatchlistRecord, new_record_id,
};
pub use events::SyncEvent;
pub use paths::{PathError, data_root, local_store_path, remote_store_path, resolve_user_path};
pub use ports::{
    ChannelEmitter, Document, DurableStore, FeedKind, FeedSource, NoopEmitter, SourceError,
    SpeechPort, SpeechPortError, SpokenLedgerPort, StoreBackend, StoreError, SyncError,
    SyncEventEmitter, decode_document, decode_documents,
};
pub use services::{
    DedupLedger, IngestReport, IngestService, ScrollbackCache, StoreRouter, SyncContext,
    SyncFacade, TypedFeed,
};
pub use settings::{SettingsError, SyncSettings, validate_settings};
pub use subscription::{SnapshotHub, Subscription};
