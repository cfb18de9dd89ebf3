// ── Pagination ──

use std::ops::Range;

use serde::Serialize;

/// Items per page when nothing else is configured.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Position of the displayed page within the full row sequence.
///
/// `end_index` is `current_page * items_per_page` and is not clipped to
/// the row count; the displayed slice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationWindow {
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub total_items: usize,
}

impl PaginationWindow {
    /// Compute the window for page `current_page` (1-based) of `total_items`.
    pub fn new(total_items: usize, current_page: usize, items_per_page: usize) -> Self {
        let current_page = current_page.max(1);
        let items_per_page = items_per_page.max(1);
        let start_index = (current_page - 1).saturating_mul(items_per_page);
        Self {
            current_page,
            items_per_page,
            total_pages: total_items.div_ceil(items_per_page),
            start_index,
            end_index: start_index.saturating_add(items_per_page),
            total_items,
        }
    }

    /// Index range of the displayed rows, clipped to `total_items`.
    pub fn displayed_range(&self) -> Range<usize> {
        let start = self.start_index.min(self.total_items);
        let end = self.end_index.min(self.total_items);
        start..end
    }

    pub fn displayed_len(&self) -> usize {
        self.displayed_range().len()
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// Slice out the displayed page.
pub fn paginate<R: Clone>(rows: &[R], current_page: usize, items_per_page: usize) -> (PaginationWindow, Vec<R>) {
    let window = PaginationWindow::new(rows.len(), current_page, items_per_page);
    let page = rows[window.displayed_range()].to_vec();
    (window, page)
}
