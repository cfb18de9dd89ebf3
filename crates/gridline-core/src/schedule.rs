// ── Cancellable scheduled work ──
//
// `schedule` runs a closure after a delay unless its token is cancelled
// first. `Debouncer` keeps at most one live token: each push cancels the
// previous pending commit and starts a fresh quiet period.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Quiet period before a search term settles.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Handle to one scheduled task.
#[derive(Debug, Clone, Default)]
pub struct TaskToken {
    cancel: CancellationToken,
}

impl TaskToken {
    /// Prevent the task from running. No effect once it has run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Run `f` on the tokio runtime after `after` unless cancelled first.
pub fn schedule<F>(after: Duration, f: F) -> TaskToken
where
    F: FnOnce() + Send + 'static,
{
    let token = TaskToken::default();
    let cancel = token.cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(after) => f(),
        }
    });
    token
}

/// Last-write-wins delayed delivery of values to a sink.
pub struct Debouncer<T> {
    delay: Duration,
    sink: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<TaskToken>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, sink: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            sink: Arc::new(sink),
            pending: None,
        }
    }

    /// Replace any pending value with `value` and restart the quiet period.
    pub fn push(&mut self, value: T) {
        self.cancel();
        let sink = Arc::clone(&self.sink);
        self.pending = Some(schedule(self.delay, move || sink(value)));
    }

    /// Discard the pending value, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}
