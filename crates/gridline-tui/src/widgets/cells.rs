//! Cell text and column sizing for entity tables.

use gridline_core::{ColumnConfig, Entity, FlatRow, Record};

/// Configured widths are in pixels; terminal columns are roughly this wide.
const PX_PER_CELL: u32 = 8;
const MIN_CELLS: u16 = 4;
const MAX_CELLS: u16 = 60;

/// Terminal width of a column.
pub fn column_cells(column: &ColumnConfig) -> u16 {
    let cells = column.width / PX_PER_CELL;
    u16::try_from(cells).unwrap_or(MAX_CELLS).clamp(MIN_CELLS, MAX_CELLS)
}

/// Display text of one field; absent and null render empty.
pub fn field_text(record: &Entity, field: &str) -> String {
    record.field(field).map(|v| v.to_string()).unwrap_or_default()
}

/// Indentation plus expander glyph for the leading cell of a tree row.
pub fn tree_prefix(row: &FlatRow<Entity>) -> String {
    let marker = match (row.has_children, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };
    format!("{}{marker}", "  ".repeat(row.depth))
}

/// Selection checkbox.
pub fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}
