//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Fixed-shape rows use
//! the `Tabled` derive; entity pages are built column by column from the
//! view's layout. Structured formats use serde, plain emits one id per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

use gridline_core::{ColumnConfig, Entity, FlatRow, PaginationWindow, Record};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Entity pages ─────────────────────────────────────────────────────

/// Table cell text for one record field.
fn cell(record: &Entity, field: &str) -> String {
    record.field(field).map(|v| v.to_string()).unwrap_or_default()
}

/// Tree marker placed before the first column of a row.
fn tree_prefix(row: &FlatRow<Entity>) -> String {
    let indent = "  ".repeat(row.depth);
    let marker = match (row.has_children, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };
    format!("{indent}{marker}")
}

/// Render one page of rows using the ordered, visible columns.
pub fn render_page(columns: &[&ColumnConfig], rows: &[FlatRow<Entity>], tree: bool) -> String {
    let visible: Vec<&ColumnConfig> = columns.iter().copied().filter(|c| c.visible).collect();

    let mut builder = Builder::default();
    builder.push_record(visible.iter().map(|c| c.display_name.clone()));
    for row in rows {
        builder.push_record(visible.iter().enumerate().map(|(i, col)| {
            let text = cell(&row.record, &col.data_field);
            if tree && i == 0 {
                format!("{}{text}", tree_prefix(row))
            } else {
                text
            }
        }));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// "Page 2/5 · rows 11-20 of 47"
pub fn pagination_footer(window: &PaginationWindow, color: bool) -> String {
    let range = window.displayed_range();
    let text = if window.total_items == 0 {
        "No records".to_owned()
    } else if range.is_empty() {
        format!(
            "Page {}/{} · no rows on this page ({} total)",
            window.current_page, window.total_pages, window.total_items
        )
    } else {
        format!(
            "Page {}/{} · rows {}-{} of {}",
            window.current_page,
            window.total_pages,
            range.start + 1,
            range.end,
            window.total_items
        )
    };
    if color { text.dimmed().to_string() } else { text }
}

/// Key/value detail listing of one record, fields in column order first.
pub fn render_detail(record: &Entity, columns: &[&ColumnConfig]) -> String {
    let mut pairs: Vec<(String, String)> = vec![("ID".into(), record.id.clone())];
    let mut seen = vec![gridline_core::ID_FIELD.to_owned()];

    for col in columns {
        if seen.contains(&col.data_field) {
            continue;
        }
        seen.push(col.data_field.clone());
        pairs.push((col.display_name.clone(), cell(record, &col.data_field)));
    }
    for (name, value) in &record.fields {
        if !seen.contains(name) {
            pairs.push((name.clone(), value.to_string()));
        }
    }

    let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0) + 1;
    pairs
        .iter()
        .map(|(k, v)| format!("{:<width$} {v}", format!("{k}:")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a mutation outcome: green check on success, red cross otherwise.
pub fn outcome_line(success: bool, message: &str, color: bool) -> String {
    match (success, color) {
        (true, true) => format!("{} {message}", "✓".green()),
        (true, false) => format!("✓ {message}"),
        (false, true) => format!("{} {message}", "✗".red()),
        (false, false) => format!("✗ {message}"),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn row(id: &str, name: &str, depth: usize, has_children: bool) -> FlatRow<Entity> {
        FlatRow {
            record: Arc::new(Entity::new(id).with("name", name)),
            depth,
            has_children,
            expanded: has_children,
        }
    }

    #[test]
    fn page_uses_visible_columns_in_order() {
        let id = ColumnConfig::new("id", 80, 0).labeled("ID");
        let name = ColumnConfig::new("name", 150, 1).labeled("Name");
        let hidden = ColumnConfig::new("secret", 150, 2).visible(false);
        let out = render_page(&[&id, &name, &hidden], &[row("1", "An", 0, false)], false);

        assert!(out.contains("ID"));
        assert!(out.contains("Name"));
        assert!(out.contains("An"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn tree_rows_are_indented() {
        let name = ColumnConfig::new("name", 150, 0);
        let out = render_page(
            &[&name],
            &[row("1", "Root", 0, true), row("2", "Leaf", 1, false)],
            true,
        );
        assert!(out.contains("▾ Root"));
        assert!(out.contains("    Leaf"));
    }

    #[test]
    fn footer_reports_window() {
        let window = PaginationWindow::new(25, 3, 10);
        assert_eq!(pagination_footer(&window, false), "Page 3/3 · rows 21-25 of 25");
        let empty = PaginationWindow::new(0, 1, 10);
        assert_eq!(pagination_footer(&empty, false), "No records");
    }

    #[test]
    fn detail_lists_unconfigured_fields_last() {
        let e = Entity::new("7").with("name", "An").with("age", 30);
        let name = ColumnConfig::new("name", 150, 0).labeled("Name");
        let out = render_detail(&e, &[&name]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID:"));
        assert!(lines[1].starts_with("Name:"));
        assert!(lines[2].starts_with("age:"));
        assert!(lines[2].ends_with("30"));
    }
}
