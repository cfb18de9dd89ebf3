// ── Reactive entity snapshot ──
//
// Whole-collection replacement with push-based change notification via
// a `watch` channel. Every refresh swaps the entire snapshot; there is no
// incremental patching.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Record;

/// Shared, immutable list of records.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// The latest fetched collection of one entity type.
pub struct EntitySnapshot<T: Record> {
    /// Version counter, bumped on every replacement.
    version: watch::Sender<u64>,
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Record> EntitySnapshot<T> {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { version, snapshot }
    }

    /// Replace the whole collection and notify subscribers.
    pub fn replace(&self, records: Vec<T>) {
        let values: Vec<Arc<T>> = records.into_iter().map(Arc::new).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.snapshot.borrow().iter().find(|r| r.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    /// Number of replacements so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }
}

impl<T: Record> Default for EntitySnapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}
