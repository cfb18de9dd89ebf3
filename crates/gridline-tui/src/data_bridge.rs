//! Data bridge: connects controller streams to TUI actions.
//!
//! One background task per view: performs the initial load, then forwards
//! every snapshot replacement and loading-state transition as an
//! [`Action`] through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use gridline_core::DynamicController;

use crate::action::{Action, Notification, ViewIdx};

/// Run the bridge for one view until cancelled.
pub async fn spawn_data_bridge(
    view: ViewIdx,
    controller: DynamicController,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut stream = controller.stream();
    let mut state = controller.watch_state();

    let _ = action_tx.send(Action::DataUpdated(view, stream.current().clone()));
    let _ = action_tx.send(Action::LoadStateChanged(view, *state.borrow_and_update()));

    // Initial fetch runs alongside the forwarding loop so the throbber shows.
    let loader = controller.clone();
    let load_tx = action_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = loader.load().await {
            warn!(view, error = %e, "initial load failed");
            let _ = load_tx.send(Action::Notify(Notification::error(e.to_string())));
        }
    });

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = stream.changed() => {
                debug!(view, rows = snapshot.len(), "dispatching DataUpdated");
                let _ = action_tx.send(Action::DataUpdated(view, snapshot));
            }
            Ok(()) = state.changed() => {
                let current = *state.borrow_and_update();
                let _ = action_tx.send(Action::LoadStateChanged(view, current));
            }
            else => break,
        }
    }

    debug!(view, "data bridge shut down");
}
