// ── Entity data controller ──
//
// Owns the authoritative snapshot of one entity type. Loads it through
// the service, refreshes it after every successful mutation, and exposes
// loading state for spinners. Cheaply cloneable; clones share state.
//
// Refreshes are not serialized: two overlapping loads race and the last
// one to resolve wins.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::codec::EntityCodec;
use crate::error::CoreError;
use crate::service::{EntityService, MutationOutcome};
use crate::store::{EntitySnapshot, Snapshot};
use crate::stream::EntityStream;

/// Pause before a refresh, giving the backend time to settle a write.
pub const REFRESH_DELAY: Duration = Duration::from_millis(1000);

/// Loading flags observable by consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadState {
    /// A list request is in flight.
    pub loading: bool,
    /// An add or edit is in flight.
    pub editing: bool,
}

impl LoadState {
    /// The exposed loading indicator: either flag set.
    pub fn is_busy(self) -> bool {
        self.loading || self.editing
    }
}

/// Data controller for one entity type.
pub struct EntityDataController<C: EntityCodec> {
    inner: Arc<ControllerInner<C>>,
}

struct ControllerInner<C: EntityCodec> {
    service: EntityService<C>,
    snapshot: EntitySnapshot<C::Entity>,
    state: watch::Sender<LoadState>,
    refresh_delay: Duration,
}

impl<C: EntityCodec> Clone for EntityDataController<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: EntityCodec> EntityDataController<C> {
    pub fn new(service: EntityService<C>) -> Self {
        Self::with_refresh_delay(service, REFRESH_DELAY)
    }

    pub fn with_refresh_delay(service: EntityService<C>, refresh_delay: Duration) -> Self {
        let (state, _) = watch::channel(LoadState::default());
        Self {
            inner: Arc::new(ControllerInner {
                service,
                snapshot: EntitySnapshot::new(),
                state,
                refresh_delay,
            }),
        }
    }

    pub fn service(&self) -> &EntityService<C> {
        &self.inner.service
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Current snapshot.
    pub fn data(&self) -> Snapshot<C::Entity> {
        self.inner.snapshot.snapshot()
    }

    /// Record with the given id in the current snapshot.
    pub fn get(&self, id: &str) -> Option<Arc<C::Entity>> {
        self.inner.snapshot.get(id)
    }

    pub fn stream(&self) -> EntityStream<C::Entity> {
        EntityStream::new(&self.inner.snapshot)
    }

    pub fn load_state(&self) -> LoadState {
        *self.inner.state.borrow()
    }

    pub fn is_loading(&self) -> bool {
        self.load_state().is_busy()
    }

    pub fn watch_state(&self) -> watch::Receiver<LoadState> {
        self.inner.state.subscribe()
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Replace the snapshot with a fresh list. On failure the previous
    /// snapshot is kept and the error returned.
    pub async fn load(&self) -> Result<(), CoreError> {
        self.inner.state.send_modify(|s| s.loading = true);
        let result = self.inner.service.list().await;
        self.inner.state.send_modify(|s| s.loading = false);

        match result {
            Ok(records) => {
                debug!(entity = %self.inner.service.name(), count = records.len(), "snapshot replaced");
                self.inner.snapshot.replace(records);
                Ok(())
            }
            Err(e) => {
                warn!(entity = %self.inner.service.name(), error = %e, "load failed, keeping previous data");
                Err(e)
            }
        }
    }

    /// Wait the refresh delay, then `load()`.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        tokio::time::sleep(self.inner.refresh_delay).await;
        self.load().await
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn add(&self, entity: &C::Entity) -> MutationOutcome {
        self.editing(self.inner.service.create(entity)).await
    }

    pub async fn edit(&self, entity: &C::Entity) -> MutationOutcome {
        self.editing(self.inner.service.update(entity)).await
    }

    pub async fn delete(&self, id: &str) -> MutationOutcome {
        let outcome = self.inner.service.delete(id).await;
        self.after_mutation(&outcome).await;
        outcome
    }

    /// Delete each id in turn, then refresh once if any delete succeeded.
    /// Outcomes come back in input order.
    pub async fn delete_many(&self, ids: &[String]) -> Vec<MutationOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            outcomes.push(self.inner.service.delete(id).await);
        }
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        if succeeded > 0 {
            info!(entity = %self.inner.service.name(), succeeded, total = ids.len(), "batch delete finished");
            let _ = self.refresh().await;
        }
        outcomes
    }

    /// Run a write with the editing flag held, refreshing on success.
    async fn editing(&self, write: impl Future<Output = MutationOutcome>) -> MutationOutcome {
        self.inner.state.send_modify(|s| s.editing = true);
        let outcome = write.await;
        self.after_mutation(&outcome).await;
        self.inner.state.send_modify(|s| s.editing = false);
        outcome
    }

    async fn after_mutation(&self, outcome: &MutationOutcome) {
        if outcome.success {
            info!(entity = %self.inner.service.name(), message = %outcome.message, "mutation succeeded");
            // The outcome stands even if the follow-up refresh fails.
            let _ = self.refresh().await;
        }
    }
}

impl<C: EntityCodec> std::fmt::Debug for EntityDataController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDataController")
            .field("entity", &self.inner.service.name())
            .field("rows", &self.inner.snapshot.len())
            .field("state", &self.load_state())
            .finish()
    }
}
