//! Change-event demultiplexer.
//!
//! Turns the full-snapshot deliveries of a subscription into typed
//! deliveries carrying both the snapshot and its id diff against the
//! previous one.

use std::collections::HashMap;

use crate::domain::Record;

/// Demultiplexer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxState {
    /// No snapshot seen yet; the next one is the bulk historical load.
    AwaitingFirstSnapshot,
    /// At least one snapshot seen; later ones are diffed.
    Steady,
}

/// Id diff between two consecutive snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<T> {
    /// Records whose id was absent from the previous snapshot, in snapshot order.
    pub added: Vec<T>,
    /// Records whose id was present but whose content differs, in snapshot order.
    pub modified: Vec<T>,
    /// Records of the previous snapshot whose id is gone, in previous order.
    pub removed: Vec<T>,
}

impl<T> ChangeSet<T> {
    pub const fn empty() -> Self {
        Self {
            added: Vec::new(),
            modified: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// One typed delivery: the snapshot plus its diff.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<T> {
    pub items: Vec<T>,
    pub is_initial_load: bool,
    /// Always empty on the initial load.
    pub changes: ChangeSet<T>,
}

/// Stateful snapshot differ for one subscription.
#[derive(Debug)]
pub struct ChangeDemultiplexer<T> {
    state: DemuxState,
    previous: Vec<T>,
}

impl<T: Record> ChangeDemultiplexer<T> {
    pub const fn new() -> Self {
        Self {
            state: DemuxState::AwaitingFirstSnapshot,
            previous: Vec::new(),
        }
    }

    pub const fn state(&self) -> DemuxState {
        self.state
    }

    /// Consume a snapshot and produce the typed delivery.
    pub fn ingest(&mut self, snapshot: Vec<T>) -> Delivery<T> {
        match self.state {
            DemuxState::AwaitingFirstSnapshot => {
                self.state = DemuxState::Steady;
                self.previous.clone_from(&snapshot);
                Delivery {
                    items: snapshot,
                    is_initial_load: true,
                    changes: ChangeSet::empty(),
                }
            }
            DemuxState::Steady => {
                let changes = diff(&self.previous, &snapshot);
                self.previous.clone_from(&snapshot);
                Delivery {
                    items: snapshot,
                    is_initial_load: false,
                    changes,
                }
            }
        }
    }
}

impl<T: Record> Default for ChangeDemultiplexer<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn diff<T: Record>(previous: &[T], current: &[T]) -> ChangeSet<T> {
    let before: HashMap<&str, &T> = previous.iter().map(|r| (r.id(), r)).collect();
    let mut changes = ChangeSet::empty();

    for record in current {
        match before.get(record.id()) {
            None => changes.added.push(record.clone()),
            Some(old) if *old != record => changes.modified.push(record.clone()),
            Some(_) => {}
        }
    }

    let after: HashMap<&str, ()> = current.iter().map(|r| (r.id(), ())).collect();
    changes.removed = previous
        .iter()
        .filter(|r| !after.contains_key(r.id()))
        .cloned()
        .collect();

    changes
}
