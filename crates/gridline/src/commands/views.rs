//! `views`: list the entity views declared in the config file.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct ViewRow {
    #[tabled(rename = "View")]
    name: String,
    #[tabled(rename = "List endpoint")]
    list: String,
    #[tabled(rename = "Tree parent")]
    tree_parent: String,
    #[tabled(rename = "Searchable")]
    searchable: String,
    #[tabled(rename = "Per page")]
    items_per_page: usize,
    #[tabled(rename = "Columns")]
    columns: usize,
}

pub fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    if cfg.views.is_empty() {
        if !global.quiet {
            eprintln!("No views configured. Add a [views.<name>] table to the config file.");
        }
        return Ok(());
    }

    let rows = cfg
        .views
        .keys()
        .map(|name| {
            let def = cfg.view_definition(name)?;
            Ok(ViewRow {
                name: def.name,
                list: def.endpoints.list,
                tree_parent: def.tree_parent.unwrap_or_default(),
                searchable: def.searchable.join(", "),
                items_per_page: def.items_per_page,
                columns: def.columns.len(),
            })
        })
        .collect::<Result<Vec<_>, CliError>>()?;

    let out = output::render_list(&global.output, &rows, ViewRow::clone, |r| r.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
