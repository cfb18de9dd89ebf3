pub mod entity_table;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use gridline_core::{ColumnStore, Entity, TableConfig, TableState, ViewDefinition};

use crate::action::Action;
use crate::component::Component;

use self::entity_table::EntityTableScreen;

/// Build one table screen per view, in order. Search terms settle through
/// the action channel.
pub fn create_screens(
    views: &[ViewDefinition],
    store: &Arc<dyn ColumnStore>,
    action_tx: &UnboundedSender<Action>,
) -> Vec<Box<dyn Component>> {
    views
        .iter()
        .enumerate()
        .map(|(idx, view)| {
            let tx = action_tx.clone();
            let table: TableState<Entity> =
                TableState::new(TableConfig::from_view(view), view.columns.clone())
                    .with_column_store(Arc::clone(store), view.column_key())
                    .with_debounce(move |term| {
                        let _ = tx.send(Action::SearchSettled(idx, term));
                    });
            Box::new(EntityTableScreen::new(idx, view.clone(), table)) as Box<dyn Component>
        })
        .collect()
}
