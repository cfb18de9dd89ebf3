//! Command dispatch: bridges CLI args -> core services -> output formatting.

pub mod columns;
pub mod config_cmd;
pub mod records;
pub mod util;
pub mod views;

use std::sync::Arc;

use gridline_core::{
    DynamicService, Entity, ServiceConfig, Snapshot, TableConfig, TableState, ViewDefinition,
};

use crate::cli::{Command, GlobalOpts, QueryArgs};
use crate::config::{self, Config};
use crate::error::CliError;

/// Everything a record command needs: the resolved view and its service.
pub struct Session {
    pub view: ViewDefinition,
    pub service: DynamicService,
}

impl Session {
    /// Resolve the view, then connect with the active profile.
    pub fn open(cfg: &Config, global: &GlobalOpts, view_name: &str) -> Result<Self, CliError> {
        let view = config::resolve_view(cfg, view_name)?;
        let service_config: ServiceConfig = config::resolve_service_config(global, cfg)?;
        let connection = service_config.connect()?;
        let service = DynamicService::new(
            view.name.clone(),
            &connection,
            view.endpoints.clone(),
            view.codec(),
        );
        tracing::debug!(view = %view.name, base_url = %service_config.base_url, "session opened");
        Ok(Self { view, service })
    }

    /// A table over the view's persisted column layout.
    pub fn table(&self) -> TableState<Entity> {
        TableState::new(TableConfig::from_view(&self.view), self.view.columns.clone())
            .with_column_store(Arc::new(config::column_store()), self.view.column_key())
    }

    /// Fetch the collection and feed it into a fresh table.
    pub async fn load_table(&self, query: &QueryArgs) -> Result<TableState<Entity>, CliError> {
        let records = self.service.list().await?;
        let snapshot: Snapshot<Entity> = Arc::new(records.into_iter().map(Arc::new).collect());

        let mut table = self.table();
        if let Some(ref field) = query.sort {
            let spec = if query.desc {
                gridline_core::SortSpec::desc(field.as_str())
            } else {
                gridline_core::SortSpec::asc(field.as_str())
            };
            table.set_sort(Some(spec));
        }
        if let Some(ref term) = query.search {
            table.commit_search(term.as_str());
        }
        table.set_data(snapshot);
        Ok(table)
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => records::list(cfg, args, global).await,
        Command::Get(args) => records::get(cfg, args, global).await,
        Command::Add(args) => records::add(cfg, args, global).await,
        Command::Edit(args) => records::edit(cfg, args, global).await,
        Command::Delete(args) => records::delete(cfg, args, global).await,
        Command::Export(args) => records::export(cfg, args, global).await,
        Command::Import(args) => records::import(cfg, args, global).await,
        // Handled before dispatch: they never touch the backend
        Command::Views | Command::Columns(_) | Command::Config(_) | Command::Completions(_) => {
            unreachable!()
        }
    }
}
