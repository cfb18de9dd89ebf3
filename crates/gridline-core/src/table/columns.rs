// ── Column layout ──

use indexmap::IndexMap;

use crate::model::{ColumnAttr, ColumnConfig};

/// Leading gutter (selection checkbox) before the first pinned column.
pub const STICKY_GUTTER: u32 = 30;

/// Visible columns, pinned first, each group by `original_order`.
pub fn ordered_columns(columns: &[ColumnConfig]) -> Vec<&ColumnConfig> {
    let mut visible: Vec<&ColumnConfig> = columns.iter().filter(|c| c.visible).collect();
    visible.sort_by_key(|c| (!c.pinned, c.original_order));
    visible
}

/// Every column, hidden ones included, in the same order as
/// [`ordered_columns`].
pub fn layout_columns(columns: &[ColumnConfig]) -> Vec<&ColumnConfig> {
    let mut all: Vec<&ColumnConfig> = columns.iter().collect();
    all.sort_by_key(|c| (!c.pinned, c.original_order));
    all
}

/// Left offset of each pinned column, keyed by column id.
pub fn sticky_offsets(ordered: &[&ColumnConfig]) -> IndexMap<String, u32> {
    let mut left = STICKY_GUTTER;
    let mut offsets = IndexMap::new();
    for col in ordered.iter().filter(|c| c.pinned) {
        offsets.insert(col.id.clone(), left);
        left = left.saturating_add(col.width);
    }
    offsets
}

/// Replace one attribute of the column with `column_id`.
///
/// Returns `false` when no such column exists.
pub fn apply_column_attr(columns: &mut [ColumnConfig], column_id: &str, attr: ColumnAttr) -> bool {
    match columns.iter_mut().find(|c| c.id == column_id) {
        Some(col) => {
            col.apply(attr);
            true
        }
        None => false,
    }
}
