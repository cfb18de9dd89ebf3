// ── Table state engine ──
//
// Derives the filtered, sorted, optionally tree-flattened and paginated
// view of one entity collection, and tracks the transient interaction
// state around it: search terms, sort, page cursor, expansion, selection
// and column layout.
//
// Derived rows are cached and rebuilt eagerly whenever an input changes,
// so every accessor is a cheap borrow.

pub mod columns;
pub mod filter;
pub mod paginate;
pub mod selection;
pub mod sort;
pub mod tree;

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::ViewDefinition;
use crate::model::{ColumnAttr, ColumnConfig, Record};
use crate::schedule::{Debouncer, SEARCH_DEBOUNCE};
use crate::store::{ColumnStore, Snapshot, load_columns, save_columns};

pub use columns::{
    STICKY_GUTTER, apply_column_attr, layout_columns, ordered_columns, sticky_offsets,
};
pub use filter::filter_and_sort;
pub use paginate::{DEFAULT_ITEMS_PER_PAGE, PaginationWindow, paginate};
pub use selection::Selection;
pub use sort::{SortOrder, SortSpec, locale_compare};
pub use tree::{FlatRow, Forest, build_tree, flatten};

/// Static behaviour of one table.
#[derive(Debug, Clone, Default)]
pub struct TableConfig {
    /// Fields the search term is matched against.
    pub searchable: Vec<String>,
    /// Parent field, when rows form a tree.
    pub tree_parent: Option<String>,
    pub items_per_page: usize,
    pub sort: Option<SortSpec>,
}

impl TableConfig {
    pub fn from_view(view: &ViewDefinition) -> Self {
        Self {
            searchable: view.searchable.clone(),
            tree_parent: view.tree_parent.clone(),
            items_per_page: view.items_per_page,
            sort: view.default_sort.clone(),
        }
    }
}

/// Table engine state for one collection of `T`.
pub struct TableState<T: Record> {
    config: TableConfig,
    data: Snapshot<T>,

    raw_term: String,
    settled_term: String,
    debouncer: Option<Debouncer<String>>,

    current_page: usize,
    items_per_page: usize,
    expanded: HashSet<String>,
    selection: Selection,

    columns: Vec<ColumnConfig>,
    default_columns: Vec<ColumnConfig>,
    store: Option<(Arc<dyn ColumnStore>, String)>,

    // Derived
    filtered: Vec<Arc<T>>,
    flattened: Vec<FlatRow<T>>,
    window: PaginationWindow,
}

impl<T: Record> TableState<T> {
    pub fn new(config: TableConfig, default_columns: Vec<ColumnConfig>) -> Self {
        let items_per_page = if config.items_per_page == 0 {
            DEFAULT_ITEMS_PER_PAGE
        } else {
            config.items_per_page
        };
        let mut state = Self {
            config,
            data: Arc::new(Vec::new()),
            raw_term: String::new(),
            settled_term: String::new(),
            debouncer: None,
            current_page: 1,
            items_per_page,
            expanded: HashSet::new(),
            selection: Selection::default(),
            columns: default_columns.clone(),
            default_columns,
            store: None,
            filtered: Vec::new(),
            flattened: Vec::new(),
            window: PaginationWindow::new(0, 1, items_per_page),
        };
        state.recompute_filtered();
        state
    }

    /// Persist column layout under `key`, loading any saved layout now.
    #[must_use]
    pub fn with_column_store(mut self, store: Arc<dyn ColumnStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        self.columns = load_columns(store.as_ref(), &key, &self.default_columns);
        self.store = Some((store, key));
        self
    }

    /// Debounce search input, delivering each settled term to `on_settled`.
    ///
    /// The receiver is expected to call [`commit_search`](Self::commit_search).
    /// Requires a tokio runtime.
    #[must_use]
    pub fn with_debounce(mut self, on_settled: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.debouncer = Some(Debouncer::new(SEARCH_DEBOUNCE, on_settled));
        self
    }

    // ── Inputs ───────────────────────────────────────────────────────

    /// Replace the underlying collection.
    pub fn set_data(&mut self, data: Snapshot<T>) {
        self.data = data;
        self.recompute_filtered();
    }

    /// Record a keystroke. The raw term takes effect at once (it switches
    /// tree rows to a flat list); filtering waits for the settled term.
    pub fn search(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.raw_term.clone_from(&term);
        match self.debouncer.as_mut() {
            Some(debouncer) => {
                debouncer.push(term);
                self.recompute_flattened();
            }
            None => self.commit_search(term),
        }
    }

    /// Apply a settled search term. A changed term resets to page 1.
    pub fn commit_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.settled_term {
            self.recompute_flattened();
            return;
        }
        debug!(term = %term, "search settled");
        self.settled_term = term;
        self.current_page = 1;
        self.recompute_filtered();
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.config.sort = sort;
        self.recompute_filtered();
    }

    /// Sort by `field` ascending, or flip the order if already sorted by it.
    pub fn toggle_sort(&mut self, field: &str) {
        let next = match &self.config.sort {
            Some(s) if s.field == field => SortSpec {
                field: s.field.clone(),
                order: s.order.flipped(),
            },
            _ => SortSpec::asc(field),
        };
        self.set_sort(Some(next));
    }

    /// Move to a page (1-based). Not clamped to `total_pages`.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
        self.recompute_window();
    }

    /// Change page size. The current page is kept as-is.
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.items_per_page = items_per_page.max(1);
        self.recompute_window();
    }

    pub fn next_page(&mut self) {
        if self.window.has_next() {
            self.set_page(self.current_page + 1);
        }
    }

    pub fn prev_page(&mut self) {
        if self.window.has_prev() {
            self.set_page(self.current_page - 1);
        }
    }

    pub fn toggle_expand(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_owned());
        }
        self.recompute_flattened();
    }

    /// Expand every node that has children.
    pub fn expand_all(&mut self) {
        if let Some(parent) = &self.config.tree_parent {
            let forest = build_tree(&self.filtered, parent);
            self.expanded = forest.children.keys().cloned().collect();
            self.recompute_flattened();
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.recompute_flattened();
    }

    /// Check or uncheck exactly the rows on the displayed page.
    pub fn select_all(&mut self, checked: bool) {
        let page = &self.flattened[self.window.displayed_range()];
        self.selection.select_all(page.iter().map(|r| r.record.id()), checked);
    }

    pub fn select_one(&mut self, id: &str, checked: bool) {
        self.selection.select_one(id, checked);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Replace one attribute of one column and persist the full layout.
    ///
    /// Returns `false` for an unknown column id.
    pub fn set_column_config(&mut self, column_id: &str, attr: ColumnAttr) -> bool {
        if !apply_column_attr(&mut self.columns, column_id, attr) {
            return false;
        }
        if let Some((store, key)) = &self.store {
            save_columns(store.as_ref(), key, &self.columns);
        }
        true
    }

    /// Restore the default layout and forget the persisted one.
    pub fn reset_columns(&mut self) {
        self.columns = self.default_columns.clone();
        if let Some((store, key)) = &self.store {
            if let Err(e) = store.remove(key) {
                warn!(key = %key, error = %e, "failed to clear column layout");
            }
        }
    }

    // ── Outputs ──────────────────────────────────────────────────────

    pub fn data(&self) -> &Snapshot<T> {
        &self.data
    }

    pub fn raw_term(&self) -> &str {
        &self.raw_term
    }

    pub fn settled_term(&self) -> &str {
        &self.settled_term
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.config.sort.as_ref()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Filtered and sorted rows, before tree flattening.
    pub fn filtered(&self) -> &[Arc<T>] {
        &self.filtered
    }

    /// Every row in display order, across all pages.
    pub fn flattened(&self) -> &[FlatRow<T>] {
        &self.flattened
    }

    /// Rows of the current page.
    pub fn displayed(&self) -> &[FlatRow<T>] {
        &self.flattened[self.window.displayed_range()]
    }

    pub fn pagination(&self) -> &PaginationWindow {
        &self.window
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Whether rows are currently shown as a tree.
    pub fn is_tree(&self) -> bool {
        self.config.tree_parent.is_some() && self.raw_term.is_empty()
    }

    /// Full column layout, including hidden columns.
    pub fn columns(&self) -> &[ColumnConfig] {
        &self.columns
    }

    /// Visible columns in display order.
    pub fn ordered_columns(&self) -> Vec<&ColumnConfig> {
        ordered_columns(&self.columns)
    }

    /// All columns in display order, hidden ones included.
    pub fn layout_columns(&self) -> Vec<&ColumnConfig> {
        layout_columns(&self.columns)
    }

    pub fn sticky_offsets(&self) -> IndexMap<String, u32> {
        sticky_offsets(&self.ordered_columns())
    }

    // ── Derivation ───────────────────────────────────────────────────

    fn recompute_filtered(&mut self) {
        self.filtered = filter_and_sort(
            &self.data,
            &self.settled_term,
            &self.config.searchable,
            self.config.sort.as_ref(),
        );
        self.recompute_flattened();
    }

    fn recompute_flattened(&mut self) {
        self.flattened = match &self.config.tree_parent {
            Some(parent) if self.raw_term.is_empty() => {
                flatten(&build_tree(&self.filtered, parent), &self.expanded)
            }
            _ => self.filtered.iter().cloned().map(FlatRow::flat).collect(),
        };
        self.recompute_window();
    }

    fn recompute_window(&mut self) {
        self.window = PaginationWindow::new(self.flattened.len(), self.current_page, self.items_per_page);
    }
}

impl<T: Record> std::fmt::Debug for TableState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableState")
            .field("rows", &self.data.len())
            .field("raw_term", &self.raw_term)
            .field("settled_term", &self.settled_term)
            .field("window", &self.window)
            .field("selected", &self.selection.len())
            .finish_non_exhaustive()
    }
}
