// ── Snapshot subscriptions ──

use tokio::sync::watch;

use crate::model::Record;
use crate::store::{EntitySnapshot, Snapshot};

/// A subscription to one entity collection.
///
/// Provides point-in-time access plus change notification, so a UI can
/// redraw whenever the controller replaces its snapshot.
pub struct EntityStream<T: Record> {
    current: Snapshot<T>,
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Record> EntityStream<T> {
    pub fn new(source: &EntitySnapshot<T>) -> Self {
        let receiver = source.subscribe();
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot seen by the last `changed()` (or at creation).
    pub fn current(&self) -> &Snapshot<T> {
        &self.current
    }

    /// The latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement. `None` once the source is dropped.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }
}
