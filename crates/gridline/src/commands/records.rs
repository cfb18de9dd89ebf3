//! Record command handlers: list, get, add, edit, delete, export, import.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use gridline_core::{Entity, MutationOutcome};

use crate::cli::{
    AddArgs, DeleteArgs, EditArgs, ExportArgs, ExportFormat, GetArgs, GlobalOpts, ImportArgs,
    ListArgs, OutputFormat,
};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util;

// ── Read ────────────────────────────────────────────────────────────

pub async fn list(cfg: &Config, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(cfg, global, &args.view)?;
    let mut table = session.load_table(&args.query).await?;

    if let Some(per_page) = args.per_page {
        table.set_items_per_page(per_page);
    }
    if args.expand_all {
        table.expand_all();
    } else {
        for id in &args.expand {
            table.toggle_expand(id);
        }
    }
    table.set_page(args.page);

    let rows = table.displayed();
    let out = match global.output {
        OutputFormat::Table => {
            let grid = output::render_page(&table.ordered_columns(), rows, table.is_tree());
            let footer =
                output::pagination_footer(table.pagination(), output::should_color(&global.color));
            format!("{grid}\n{footer}")
        }
        _ => {
            let records: Vec<&Entity> = rows.iter().map(|r| &*r.record).collect();
            output::render_single(&global.output, &records, |_| String::new(), |rs| {
                rs.iter().map(|e| e.id.as_str()).collect::<Vec<_>>().join("\n")
            })?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn get(cfg: &Config, args: GetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(cfg, global, &args.view)?;
    let record = fetch_one(&session, &args.id).await?;

    let table = session.table();
    let columns = table.ordered_columns();
    let out = output::render_single(
        &global.output,
        &record,
        |e| output::render_detail(e, &columns),
        |e| e.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn fetch_one(session: &Session, id: &str) -> Result<Entity, CliError> {
    let records = session.service.list().await?;
    records
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| CliError::NotFound {
            entity: session.view.name.clone(),
            identifier: id.into(),
        })
}

// ── Write ───────────────────────────────────────────────────────────

pub async fn add(cfg: &Config, args: AddArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut entity = match args.from_file {
        Some(ref path) => util::entity_from_json(&util::read_json_file(path)?)?,
        None => Entity::default(),
    };
    util::apply_assignments(&mut entity, &args.set)?;
    if entity.fields.is_empty() {
        return Err(CliError::Validation {
            field: "record".into(),
            reason: "nothing to add; pass --set FIELD=VALUE or --from-file".into(),
        });
    }

    let session = Session::open(cfg, global, &args.view)?;
    let outcome = session.service.create(&entity).await;
    report(&outcome, global)
}

pub async fn edit(cfg: &Config, args: EditArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(cfg, global, &args.view)?;
    let mut entity = fetch_one(&session, &args.id).await?;

    if let Some(ref path) = args.from_file {
        let patch = util::entity_from_json(&util::read_json_file(path)?)?;
        entity.merge(&patch);
    }
    util::apply_assignments(&mut entity, &args.set)?;
    entity.id.clone_from(&args.id);

    let outcome = session.service.update(&entity).await;
    report(&outcome, global)
}

pub async fn delete(cfg: &Config, args: DeleteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let prompt = match args.ids.as_slice() {
        [id] => format!("Delete {} '{id}'?", args.view),
        ids => format!("Delete {} {} records?", ids.len(), args.view),
    };
    if !util::confirm(&prompt, "delete", global.yes)? {
        return Ok(());
    }

    let session = Session::open(cfg, global, &args.view)?;
    let color = output::should_color(&global.color);
    let mut failed = 0;
    let mut last_failure = String::new();

    for id in &args.ids {
        let outcome = session.service.delete(id).await;
        debug!(%id, success = outcome.success, "delete finished");
        if !outcome.success {
            failed += 1;
            last_failure.clone_from(&outcome.message);
        }
        if !global.quiet {
            eprintln!(
                "{}",
                output::outcome_line(outcome.success, &format!("{id}: {}", outcome.message), color)
            );
        }
    }

    match (failed, args.ids.len()) {
        (0, _) => Ok(()),
        (_, 1) => Err(CliError::Rejected {
            message: last_failure,
        }),
        (failed, total) => Err(CliError::PartialFailure { failed, total }),
    }
}

/// Print a write outcome; a rejected write becomes a non-zero exit.
fn report(outcome: &MutationOutcome, global: &GlobalOpts) -> Result<(), CliError> {
    match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let color = output::should_color(&global.color);
            if !global.quiet {
                eprintln!("{}", output::outcome_line(outcome.success, &outcome.message, color));
            }
        }
        _ => {
            let out = output::render_single(&global.output, outcome, |_| String::new(), |_| {
                String::new()
            })?;
            output::print_output(&out, global.quiet);
        }
    }

    if outcome.success {
        Ok(())
    } else {
        Err(CliError::Rejected {
            message: outcome.message.clone(),
        })
    }
}

// ── Bulk ────────────────────────────────────────────────────────────

pub async fn export(cfg: &Config, args: ExportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(cfg, global, &args.view)?;
    let table = session.load_table(&args.query).await?;
    let records: Vec<&Entity> = table.filtered().iter().map(|e| &**e).collect();

    let body = match args.format {
        ExportFormat::Json => output::render_json(&records, false)?,
        ExportFormat::Yaml => output::render_yaml(&records)?,
    };

    match args.file {
        Some(ref path) => {
            std::fs::write(path, body)?;
            if !global.quiet {
                eprintln!(
                    "✓ Exported {} {} records to {}",
                    records.len(),
                    args.view,
                    path.display()
                );
            }
        }
        None => output::print_output(&body, global.quiet),
    }
    Ok(())
}

pub async fn import(cfg: &Config, args: ImportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let records = parse_import(&util::read_json_file(&args.file)?)?;
    let session = Session::open(cfg, global, &args.view)?;

    let progress = if global.quiet || !std::io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(u64::try_from(records.len()).unwrap_or(u64::MAX))
    };
    progress.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let color = output::should_color(&global.color);
    let mut failed = 0;
    for (index, record) in records.iter().enumerate() {
        let outcome = session.service.create(record).await;
        if !outcome.success {
            failed += 1;
        }
        let line = output::outcome_line(
            outcome.success,
            &format!("#{}: {}", index + 1, outcome.message),
            color,
        );
        if !global.quiet {
            progress.suspend(|| eprintln!("{line}"));
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed,
            total: records.len(),
        })
    }
}

/// Import files hold an array of objects, as written by `export`.
fn parse_import(value: &serde_json::Value) -> Result<Vec<Entity>, CliError> {
    let serde_json::Value::Array(items) = value else {
        return Err(CliError::Validation {
            field: "file".into(),
            reason: "expected a JSON array of records".into(),
        });
    };
    items.iter().map(util::entity_from_json).collect()
}
