//! `columns`: inspect and edit the persisted column layout of a view.
//!
//! Works offline: only the config file and the column store are touched.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use gridline_core::{ColumnAttr, Entity, TableConfig, TableState};

use crate::cli::{ColumnsArgs, ColumnsCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct ColumnRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Field")]
    data_field: String,
    #[tabled(rename = "Name")]
    display_name: String,
    #[tabled(rename = "Width")]
    width: u32,
    #[tabled(rename = "Visible")]
    visible: bool,
    #[tabled(rename = "Pinned")]
    pinned: bool,
    #[tabled(rename = "Order")]
    original_order: u32,
    /// Left offset of a pinned column.
    #[tabled(rename = "Left")]
    sticky_left: String,
}

fn rows(table: &TableState<Entity>) -> Vec<ColumnRow> {
    let offsets = table.sticky_offsets();
    table
        .layout_columns()
        .into_iter()
        .map(|c| ColumnRow {
            id: c.id.clone(),
            data_field: c.data_field.clone(),
            display_name: c.display_name.clone(),
            width: c.width,
            visible: c.visible,
            pinned: c.pinned,
            original_order: c.original_order,
            sticky_left: offsets.get(&c.id).map(ToString::to_string).unwrap_or_default(),
        })
        .collect()
}

pub fn handle(cfg: &Config, args: ColumnsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let view = config::resolve_view(cfg, &args.view)?;
    let mut table: TableState<Entity> =
        TableState::new(TableConfig::from_view(&view), view.columns.clone())
            .with_column_store(Arc::new(config::column_store()), view.column_key());

    match args.command {
        ColumnsCommand::Show => {}
        ColumnsCommand::Set {
            column,
            visible,
            pinned,
            width,
            name,
            order,
        } => {
            let attrs: Vec<ColumnAttr> = [
                visible.map(ColumnAttr::Visible),
                pinned.map(ColumnAttr::Pinned),
                width.map(ColumnAttr::Width),
                name.map(ColumnAttr::DisplayName),
                order.map(ColumnAttr::OriginalOrder),
            ]
            .into_iter()
            .flatten()
            .collect();

            if attrs.is_empty() {
                return Err(CliError::Validation {
                    field: "columns set".into(),
                    reason: "pass at least one of --visible, --pinned, --width, --name, --order"
                        .into(),
                });
            }
            for attr in attrs {
                if !table.set_column_config(&column, attr) {
                    let known: Vec<&str> = table.columns().iter().map(|c| c.id.as_str()).collect();
                    return Err(CliError::Validation {
                        field: "column".into(),
                        reason: format!(
                            "unknown column '{column}' in view '{}' (known: {})",
                            args.view,
                            config::available(known.iter())
                        ),
                    });
                }
            }
            if !global.quiet {
                eprintln!("✓ Updated column '{column}' of view '{}'", args.view);
            }
        }
        ColumnsCommand::Reset => {
            table.reset_columns();
            if !global.quiet {
                eprintln!("✓ Restored default columns of view '{}'", args.view);
            }
        }
    }

    let rows = rows(&table);
    let out = output::render_list(&global.output, &rows, ColumnRow::clone, |r| r.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
