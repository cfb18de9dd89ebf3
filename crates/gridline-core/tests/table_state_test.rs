#![allow(clippy::unwrap_used)]
// Behaviour of `TableState` as a front end sees it.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use gridline_core::table::DEFAULT_ITEMS_PER_PAGE;
use gridline_core::{
    ColumnAttr, ColumnConfig, ColumnStore, Entity, MemoryColumnStore, SortOrder, SortSpec,
    TableConfig, TableState,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config() -> TableConfig {
    TableConfig {
        searchable: vec!["nameVi".into(), "code".into()],
        tree_parent: None,
        items_per_page: 10,
        sort: None,
    }
}

fn tree_config() -> TableConfig {
    TableConfig {
        tree_parent: Some("parentId".into()),
        ..config()
    }
}

fn rows(n: usize) -> Arc<Vec<Arc<Entity>>> {
    Arc::new(
        (1..=n)
            .map(|i| Arc::new(Entity::new(i.to_string()).with("code", format!("C{i:02}"))))
            .collect(),
    )
}

fn departments() -> Arc<Vec<Arc<Entity>>> {
    let d = |id: &str, parent: &str, name: &str| {
        Arc::new(Entity::new(id).with("parentId", parent).with("nameVi", name))
    };
    Arc::new(vec![
        d("1", "0", "Head office"),
        d("2", "1", "Sales"),
        d("3", "2", "Sales north"),
        d("4", "1", "Support"),
        d("5", "0", "Branch"),
    ])
}

fn ids(table: &TableState<Entity>) -> Vec<String> {
    table.displayed().iter().map(|r| r.record.id.clone()).collect()
}

fn columns() -> Vec<ColumnConfig> {
    vec![
        ColumnConfig::new("code", 80, 0),
        ColumnConfig::new("nameVi", 200, 1).labeled("Name"),
    ]
}

// ── Search and filter ───────────────────────────────────────────────

#[test]
fn test_search_matches_unicode_case_insensitively() {
    let mut table = TableState::new(config(), columns());
    table.set_data(Arc::new(vec![
        Arc::new(Entity::new("1").with("nameVi", "An")),
        Arc::new(Entity::new("2").with("nameVi", "Bình")),
    ]));

    table.search("bình");

    assert_eq!(ids(&table), ["2"]);
}

#[test]
fn test_settled_search_change_resets_page() {
    let mut table = TableState::new(config(), columns());
    table.set_data(rows(25));
    table.set_page(3);
    assert_eq!(table.pagination().current_page, 3);

    table.search("C0");
    assert_eq!(table.pagination().current_page, 1);
    assert_eq!(table.pagination().total_items, 9);
}

#[test]
fn test_page_is_not_clamped_when_page_size_grows() {
    let mut table = TableState::new(config(), columns());
    table.set_data(rows(25));
    table.set_page(3);
    table.set_items_per_page(20);

    assert_eq!(table.pagination().current_page, 3);
    assert!(table.displayed().is_empty());
}

#[test]
fn test_zero_page_size_uses_default() {
    let table: TableState<Entity> = TableState::new(
        TableConfig {
            items_per_page: 0,
            ..config()
        },
        columns(),
    );
    assert_eq!(table.pagination().items_per_page, DEFAULT_ITEMS_PER_PAGE);
}

// ── Pagination ──────────────────────────────────────────────────────

#[test]
fn test_third_page_of_twenty_five_rows() {
    let mut table = TableState::new(config(), columns());
    table.set_data(rows(25));
    table.set_page(3);

    let window = table.pagination();
    assert_eq!(window.start_index, 20);
    assert_eq!(window.end_index, 30);
    assert_eq!(table.displayed().len(), 5);
    assert_eq!(ids(&table), ["21", "22", "23", "24", "25"]);
}

#[test]
fn test_next_and_prev_stop_at_the_edges() {
    let mut table = TableState::new(config(), columns());
    table.set_data(rows(15));
    table.prev_page();
    assert_eq!(table.pagination().current_page, 1);
    table.next_page();
    table.next_page();
    assert_eq!(table.pagination().current_page, 2);
}

#[test]
fn test_pagination_window_snapshot() {
    let mut table = TableState::new(config(), columns());
    table.set_data(rows(25));
    table.set_page(2);

    insta::assert_debug_snapshot!(table.pagination(), @r"
    PaginationWindow {
        current_page: 2,
        items_per_page: 10,
        total_pages: 3,
        start_index: 10,
        end_index: 20,
        total_items: 25,
    }
    ");
}

// ── Selection ───────────────────────────────────────────────────────

#[test]
fn test_select_all_is_scoped_to_the_page() {
    let mut table = TableState::new(
        TableConfig {
            items_per_page: 2,
            ..config()
        },
        columns(),
    );
    table.set_data(rows(5));
    table.select_one("1", true);
    table.set_page(2);

    table.select_all(true);
    assert_eq!(table.selection().ids(), ["3", "4"]);

    table.select_all(false);
    assert!(table.selection().is_empty());
}

// ── Sort ────────────────────────────────────────────────────────────

#[test]
fn test_toggle_sort_flips_order_on_same_field() {
    let mut table = TableState::new(config(), columns());
    table.set_data(rows(3));

    table.toggle_sort("code");
    assert_eq!(table.sort().unwrap().order, SortOrder::Asc);
    table.toggle_sort("code");
    assert_eq!(table.sort(), Some(&SortSpec::desc("code")));
    assert_eq!(ids(&table), ["3", "2", "1"]);

    table.toggle_sort("nameVi");
    assert_eq!(table.sort(), Some(&SortSpec::asc("nameVi")));
}

// ── Tree ────────────────────────────────────────────────────────────

#[test]
fn test_expand_toggle_is_idempotent() {
    let mut table = TableState::new(tree_config(), columns());
    table.set_data(departments());
    let collapsed = ids(&table);
    assert_eq!(collapsed, ["1", "5"]);

    table.toggle_expand("1");
    assert_eq!(ids(&table), ["1", "2", "4", "5"]);
    table.toggle_expand("2");
    assert_eq!(ids(&table), ["1", "2", "3", "4", "5"]);
    assert_eq!(table.displayed()[2].depth, 2);

    table.toggle_expand("2");
    table.toggle_expand("1");
    assert_eq!(ids(&table), collapsed);
}

#[test]
fn test_search_flattens_tree_to_depth_zero() {
    let mut table = TableState::new(tree_config(), columns());
    table.set_data(departments());
    table.expand_all();
    assert!(table.displayed().iter().any(|r| r.depth > 0));

    table.search("sales");

    assert!(!table.is_tree());
    assert_eq!(ids(&table), ["2", "3"]);
    assert!(table.displayed().iter().all(|r| r.depth == 0));
}

#[test]
fn test_collapse_all_restores_roots() {
    let mut table = TableState::new(tree_config(), columns());
    table.set_data(departments());
    table.expand_all();
    assert_eq!(table.flattened().len(), 5);
    table.collapse_all();
    assert_eq!(ids(&table), ["1", "5"]);
}

// ── Debounced search ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_debounced_search_commits_only_the_settled_term() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut table = TableState::new(tree_config(), columns()).with_debounce(move |term| {
        let _ = tx.send(term);
    });
    table.set_data(departments());

    table.search("s");
    tokio::time::sleep(Duration::from_millis(300)).await;
    table.search("sup");

    // The raw term switches to the flat list at once; filtering waits.
    assert_eq!(table.raw_term(), "sup");
    assert_eq!(table.settled_term(), "");
    assert_eq!(table.flattened().len(), 5);

    let settled = rx.recv().await.unwrap();
    assert_eq!(settled, "sup");
    table.commit_search(settled);

    assert_eq!(ids(&table), ["4"]);
    assert!(rx.try_recv().is_err());
}

// ── Columns ─────────────────────────────────────────────────────────

#[test]
fn test_column_changes_persist_and_reload() {
    let store: Arc<dyn ColumnStore> = Arc::new(MemoryColumnStore::new());

    let mut table: TableState<Entity> =
        TableState::new(config(), columns()).with_column_store(Arc::clone(&store), "columns.customer");
    assert!(table.set_column_config("nameVi", ColumnAttr::Pinned(true)));
    assert!(table.set_column_config("code", ColumnAttr::Width(120)));
    assert!(!table.set_column_config("missing", ColumnAttr::Visible(false)));

    let ordered: Vec<_> = table.ordered_columns().iter().map(|c| c.id.clone()).collect();
    assert_eq!(ordered, ["nameVi", "code"]);
    assert_eq!(table.sticky_offsets()["nameVi"], 30);

    let reloaded: TableState<Entity> =
        TableState::new(config(), columns()).with_column_store(Arc::clone(&store), "columns.customer");
    assert_eq!(reloaded.columns(), table.columns());
    assert_eq!(reloaded.columns()[0].width, 120);
}

#[test]
fn test_reset_columns_forgets_saved_layout() {
    let store: Arc<dyn ColumnStore> = Arc::new(MemoryColumnStore::new());
    let mut table: TableState<Entity> =
        TableState::new(config(), columns()).with_column_store(Arc::clone(&store), "k");
    table.set_column_config("code", ColumnAttr::Visible(false));
    assert_eq!(table.ordered_columns().len(), 1);

    table.reset_columns();

    assert_eq!(table.columns(), columns().as_slice());
    assert!(store.load("k").unwrap().is_none());
}
