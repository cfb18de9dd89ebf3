//! Entity table screen: one per configured view.
//!
//! Wraps a core [`TableState`] and maps keys onto its operations. Search
//! keystrokes go through the table's debouncer, which reports back with
//! [`Action::SearchSettled`].

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState as Viewport, Wrap,
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_input::{Input, InputRequest};

use gridline_core::{
    ColumnAttr, Entity, FlatRow, Record, SortOrder, SortSpec, TableState, ViewDefinition,
};

use crate::action::{Action, ViewIdx};
use crate::component::Component;
use crate::theme;
use crate::widgets::{cells, centered_rect};

/// Page sizes offered by `+` / `-`.
const PAGE_SIZES: [usize; 6] = [5, 10, 20, 25, 50, 100];

/// Width step for the column panel, in configured (pixel) units.
const WIDTH_STEP: u32 = 16;
const MIN_WIDTH: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Browse,
    Search,
    Columns,
}

pub struct EntityTableScreen {
    view_idx: ViewIdx,
    view: ViewDefinition,
    focused: bool,
    table: TableState<Entity>,
    mode: Mode,
    search: Input,
    /// Cursor within the displayed page.
    cursor: usize,
    /// Cursor within the column panel.
    panel_cursor: usize,
    detail_open: bool,
    busy: bool,
    throbber_state: ThrobberState,
}

impl EntityTableScreen {
    pub fn new(view_idx: ViewIdx, view: ViewDefinition, table: TableState<Entity>) -> Self {
        Self {
            view_idx,
            view,
            focused: false,
            table,
            mode: Mode::default(),
            search: Input::default(),
            cursor: 0,
            panel_cursor: 0,
            detail_open: false,
            busy: false,
            throbber_state: ThrobberState::default(),
        }
    }

    fn cursor_row(&self) -> Option<&FlatRow<Entity>> {
        self.table.displayed().get(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        let len = self.table.displayed().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.table.displayed().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    // ── Browse mode ──────────────────────────────────────────────────

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.cursor = self.table.displayed().len().saturating_sub(1);
            }

            KeyCode::Char('n') | KeyCode::PageDown | KeyCode::Right => {
                self.table.next_page();
                self.cursor = 0;
            }
            KeyCode::Char('p') | KeyCode::PageUp | KeyCode::Left => {
                self.table.prev_page();
                self.cursor = 0;
            }
            KeyCode::Char('+' | '=') => self.step_page_size(true),
            KeyCode::Char('-') => self.step_page_size(false),

            KeyCode::Enter => {
                if let Some(row) = self.cursor_row().filter(|r| r.has_children) {
                    let id = row.record.id().to_owned();
                    self.table.toggle_expand(&id);
                }
            }
            KeyCode::Char('e') => self.table.expand_all(),
            KeyCode::Char('E') => {
                self.table.collapse_all();
                self.clamp_cursor();
            }

            KeyCode::Char(' ') => {
                if let Some(row) = self.cursor_row() {
                    let id = row.record.id().to_owned();
                    let checked = !self.table.selection().is_selected(&id);
                    self.table.select_one(&id, checked);
                    self.move_cursor(1);
                }
            }
            KeyCode::Char('a') => {
                let all_checked = !self.table.displayed().is_empty()
                    && self
                        .table
                        .displayed()
                        .iter()
                        .all(|r| self.table.selection().is_selected(r.record.id()));
                self.table.select_all(!all_checked);
            }
            KeyCode::Esc => self.table.clear_selection(),

            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('o') => {
                if let Some(field) = self.table.sort().map(|s| s.field.clone()) {
                    self.table.toggle_sort(&field);
                }
            }

            KeyCode::Char('/') => {
                self.search = Input::new(self.table.raw_term().to_owned());
                self.mode = Mode::Search;
            }
            KeyCode::Char('c') => {
                self.panel_cursor = 0;
                self.mode = Mode::Columns;
            }
            KeyCode::Char('i') => self.detail_open = !self.detail_open,

            KeyCode::Char('d') | KeyCode::Delete => return self.request_delete(),
            KeyCode::Char('r') => return Some(Action::RequestRefresh(self.view_idx)),
            _ => {}
        }
        None
    }

    fn step_page_size(&mut self, grow: bool) {
        let current = self.table.pagination().items_per_page;
        let next = if grow {
            PAGE_SIZES.iter().copied().find(|&n| n > current)
        } else {
            PAGE_SIZES.iter().rev().copied().find(|&n| n < current)
        };
        if let Some(n) = next {
            self.table.set_items_per_page(n);
            self.clamp_cursor();
        }
    }

    /// Advance the sort to the next visible column, keeping the direction.
    fn cycle_sort(&mut self) {
        let fields: Vec<String> = self
            .table
            .ordered_columns()
            .iter()
            .map(|c| c.data_field.clone())
            .collect();
        let order = self.table.sort().map_or(SortOrder::Asc, |s| s.order);
        let next = self
            .table
            .sort()
            .and_then(|s| fields.iter().position(|f| *f == s.field))
            .map_or(0, |i| (i + 1) % fields.len().max(1));
        if let Some(field) = fields.get(next) {
            self.table.set_sort(Some(SortSpec {
                field: field.clone(),
                order,
            }));
        }
    }

    /// Checked rows, or the cursor row when nothing is checked.
    fn request_delete(&self) -> Option<Action> {
        let ids = if self.table.selection().is_empty() {
            vec![self.cursor_row()?.record.id().to_owned()]
        } else {
            self.table.selection().ids()
        };
        Some(Action::RequestDelete(self.view_idx, ids))
    }

    // ── Search mode ──────────────────────────────────────────────────

    fn handle_search_key(&mut self, key: KeyEvent) {
        let request = match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                self.search.reset();
                self.table.search("");
                self.mode = Mode::Browse;
                self.cursor = 0;
                return;
            }
            (_, KeyCode::Enter) => {
                self.mode = Mode::Browse;
                return;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => InputRequest::DeletePrevWord,
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => InputRequest::DeleteLine,
            (_, KeyCode::Backspace) => InputRequest::DeletePrevChar,
            (_, KeyCode::Delete) => InputRequest::DeleteNextChar,
            (_, KeyCode::Left) => InputRequest::GoToPrevChar,
            (_, KeyCode::Right) => InputRequest::GoToNextChar,
            (_, KeyCode::Home) => InputRequest::GoToStart,
            (_, KeyCode::End) => InputRequest::GoToEnd,
            (_, KeyCode::Char(c)) => InputRequest::InsertChar(c),
            _ => return,
        };
        if self.search.handle(request).is_some_and(|change| change.value) {
            self.table.search(self.search.value());
            self.cursor = 0;
        }
    }

    // ── Column panel ─────────────────────────────────────────────────

    fn handle_column_key(&mut self, key: KeyEvent) {
        let Some(column) = self.table.layout_columns().get(self.panel_cursor).copied().cloned()
        else {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('c' | 'q')) {
                self.mode = Mode::Browse;
            }
            return;
        };
        let count = self.table.columns().len();

        let attr = match key.code {
            KeyCode::Esc | KeyCode::Char('c' | 'q') => {
                self.mode = Mode::Browse;
                return;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.panel_cursor = (self.panel_cursor + 1).min(count.saturating_sub(1));
                return;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.panel_cursor = self.panel_cursor.saturating_sub(1);
                return;
            }
            KeyCode::Char('R') => {
                self.table.reset_columns();
                return;
            }
            KeyCode::Char(' ' | 'v') => ColumnAttr::Visible(!column.visible),
            KeyCode::Char('p') => ColumnAttr::Pinned(!column.pinned),
            KeyCode::Char('<' | 'h') | KeyCode::Left => {
                ColumnAttr::Width(column.width.saturating_sub(WIDTH_STEP).max(MIN_WIDTH))
            }
            KeyCode::Char('>' | 'l') | KeyCode::Right => {
                ColumnAttr::Width(column.width.saturating_add(WIDTH_STEP))
            }
            _ => return,
        };
        let pinning = matches!(attr, ColumnAttr::Pinned(_));
        self.table.set_column_config(&column.id, attr);
        // Pinning reorders the panel; keep the cursor on the same column.
        if pinning {
            if let Some(pos) = self
                .table
                .layout_columns()
                .iter()
                .position(|c| c.id == column.id)
            {
                self.panel_cursor = pos;
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn title(&self) -> String {
        let shown = self.table.filtered().len();
        let total = self.table.data().len();
        let selected = self.table.selection().len();
        let mut title = format!(" {} ({shown}/{total})", self.view.name);
        if selected > 0 {
            title.push_str(&format!(" · {selected} selected"));
        }
        title.push(' ');
        title
    }

    fn render_search_line(&self, frame: &mut Frame, area: Rect) {
        let active = self.mode == Mode::Search;
        let value = if active {
            self.search.value()
        } else {
            self.table.raw_term()
        };
        let mut spans = vec![
            Span::styled(" / ", Style::default().fg(theme::ELECTRIC_PURPLE)),
            Span::styled(value.to_owned(), Style::default().fg(theme::NEON_CYAN)),
        ];
        if active {
            spans.push(Span::styled("█", Style::default().fg(theme::NEON_CYAN)));
            spans.push(Span::styled("  Esc clear  Enter done", theme::key_hint()));
        } else if self.table.raw_term() != self.table.settled_term() {
            spans.push(Span::styled("  …", theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        if active {
            let cursor = u16::try_from(self.search.visual_cursor()).unwrap_or(u16::MAX);
            frame.set_cursor_position((area.x.saturating_add(3).saturating_add(cursor), area.y));
        }
    }

    fn sort_marker(&self, field: &str) -> Option<&'static str> {
        self.table
            .sort()
            .filter(|s| s.field == field)
            .map(|s| match s.order {
                SortOrder::Asc => " ▲",
                SortOrder::Desc => " ▼",
            })
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let columns = self.table.ordered_columns();
        let tree = self.table.is_tree();

        let mut header_cells = vec![Cell::from("").style(theme::table_header())];
        for col in &columns {
            let cell = match self.sort_marker(&col.data_field) {
                Some(marker) => Cell::from(format!("{}{marker}", col.display_name))
                    .style(theme::table_header_sorted()),
                None => Cell::from(col.display_name.clone()).style(theme::table_header()),
            };
            header_cells.push(cell);
        }
        let header = Row::new(header_cells);

        let rows: Vec<Row> = self
            .table
            .displayed()
            .iter()
            .map(|row| {
                let checked = self.table.selection().is_selected(row.record.id());
                let mut cells_out = vec![Cell::from(cells::checkbox(checked))];
                for (i, col) in columns.iter().enumerate() {
                    let mut text = cells::field_text(&row.record, &col.data_field);
                    if tree && i == 0 {
                        text.insert_str(0, &cells::tree_prefix(row));
                    }
                    let cell = Cell::from(text);
                    cells_out.push(if col.pinned {
                        cell.style(Style::default().bg(theme::BG_PINNED))
                    } else {
                        cell
                    });
                }
                let style = if checked {
                    theme::table_checked()
                } else {
                    theme::table_row()
                };
                Row::new(cells_out).style(style)
            })
            .collect();

        let mut widths = vec![Constraint::Length(3)];
        widths.extend(columns.iter().map(|c| Constraint::Length(cells::column_cells(c))));

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut viewport = Viewport::default();
        if !self.table.displayed().is_empty() {
            viewport.select(Some(self.cursor));
        }
        frame.render_stateful_widget(table, area, &mut viewport);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::horizontal([Constraint::Min(1), Constraint::Length(16)]).split(area);

        let text = pagination_text(&self.table);
        let hints = "  / search  s sort  o order  c columns  d delete  r refresh";
        let line = Line::from(vec![
            Span::styled(format!(" {text}"), Style::default().fg(theme::DIM_WHITE)),
            Span::styled(hints, theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), layout[0]);

        if self.busy {
            let throbber = Throbber::default()
                .label("Loading…")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
        }
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Record ")
            .title_style(theme::title_style())
            .borders(Borders::TOP)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(row) = self.cursor_row() else {
            frame.render_widget(Paragraph::new(Span::styled("  No record", theme::key_hint())), inner);
            return;
        };
        let body = serde_json::to_string_pretty(&*row.record)
            .unwrap_or_else(|e| format!("unprintable record: {e}"));
        frame.render_widget(
            Paragraph::new(body)
                .style(Style::default().fg(theme::DIM_WHITE))
                .wrap(Wrap { trim: false }),
            inner,
        );
    }

    fn render_column_panel(&self, frame: &mut Frame, area: Rect) {
        let columns = self.table.layout_columns();
        let offsets = self.table.sticky_offsets();
        let height = u16::try_from(columns.len()).unwrap_or(u16::MAX).saturating_add(4);
        let panel = centered_rect(area, 56, height);
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .title(" Columns ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let mut lines: Vec<Line> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let pin = match offsets.get(&col.id) {
                    Some(left) => format!("pinned @{left}"),
                    None if col.pinned => "pinned".into(),
                    None => String::new(),
                };
                let text = format!(
                    " {} {:<20} {:>5}  {pin}",
                    cells::checkbox(col.visible),
                    col.display_name,
                    col.width
                );
                let style = if i == self.panel_cursor {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                Line::from(Span::styled(text, style))
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " v show  p pin  </> width  R reset  Esc close",
            theme::key_hint(),
        )));
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Footer text for the current page.
fn pagination_text(table: &TableState<Entity>) -> String {
    let window = table.pagination();
    if window.total_items == 0 {
        return "No records".into();
    }
    let range = window.displayed_range();
    if range.is_empty() {
        return format!(
            "Page {}/{} · no rows on this page ({} total)",
            window.current_page, window.total_pages, window.total_items
        );
    }
    format!(
        "Page {}/{} · rows {}-{} of {} · {}/page",
        window.current_page,
        window.total_pages,
        range.start + 1,
        range.end,
        window.total_items,
        window.items_per_page
    )
}

impl Component for EntityTableScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Search => {
                self.handle_search_key(key);
                None
            }
            Mode::Columns => {
                self.handle_column_key(key);
                None
            }
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataUpdated(view, snapshot) if *view == self.view_idx => {
                self.table.set_data(snapshot.clone());
                self.clamp_cursor();
            }
            Action::LoadStateChanged(view, state) if *view == self.view_idx => {
                self.busy = state.is_busy();
            }
            Action::SearchSettled(view, term) if *view == self.view_idx => {
                self.table.commit_search(term.as_str());
                self.clamp_cursor();
            }
            Action::ClearSelection(view) if *view == self.view_idx => {
                self.table.clear_selection();
            }
            Action::Tick if self.busy => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.title())
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (table_area, detail_area) = if self.detail_open {
            let chunks = Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(inner);
            (chunks[0], Some(chunks[1]))
        } else {
            (inner, None)
        };

        let show_search = self.mode == Mode::Search || !self.table.raw_term().is_empty();
        let layout = Layout::vertical([
            Constraint::Length(u16::from(show_search)),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(table_area);

        if show_search {
            self.render_search_line(frame, layout[0]);
        }
        self.render_table(frame, layout[1]);
        self.render_footer(frame, layout[2]);

        if let Some(detail) = detail_area {
            self.render_detail(frame, detail);
        }
        if self.mode == Mode::Columns {
            self.render_column_panel(frame, area);
        }
    }

    fn captures_input(&self) -> bool {
        self.mode != Mode::Browse
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        &self.view.name
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use gridline_core::{
        ColumnConfig, EntityEndpoints, LoadState, MemoryColumnStore, Snapshot, TableConfig,
    };
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(screen: &mut EntityTableScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn typed(screen: &mut EntityTableScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    fn view(tree_parent: Option<&str>) -> ViewDefinition {
        ViewDefinition {
            name: "customer".into(),
            endpoints: EntityEndpoints::conventional("customer"),
            wire_fields: IndexMap::new(),
            searchable: vec!["name".into(), "code".into()],
            tree_parent: tree_parent.map(Into::into),
            items_per_page: 2,
            default_sort: None,
            columns: vec![
                ColumnConfig::new("code", 80, 0).labeled("Code"),
                ColumnConfig::new("name", 160, 1).labeled("Name"),
            ],
        }
    }

    /// Screen without a debouncer: searches commit immediately.
    fn screen(tree_parent: Option<&str>) -> EntityTableScreen {
        let view = view(tree_parent);
        let table = TableState::new(TableConfig::from_view(&view), view.columns.clone())
            .with_column_store(Arc::new(MemoryColumnStore::new()), view.column_key());
        EntityTableScreen::new(0, view, table)
    }

    fn customers() -> Snapshot<Entity> {
        Arc::new(
            [("1", "C01", "An"), ("2", "C02", "Bình"), ("3", "K03", "Cường")]
                .into_iter()
                .map(|(id, code, name)| Arc::new(Entity::new(id).with("code", code).with("name", name)))
                .collect(),
        )
    }

    fn categories() -> Snapshot<Entity> {
        Arc::new(vec![
            Arc::new(Entity::new("1").with("name", "Food").with("parentId", "0")),
            Arc::new(Entity::new("2").with("name", "Fruit").with("parentId", "1")),
            Arc::new(Entity::new("3").with("name", "Tools").with("parentId", "0")),
        ])
    }

    fn loaded(tree_parent: Option<&str>, data: Snapshot<Entity>) -> EntityTableScreen {
        let mut s = screen(tree_parent);
        s.update(&Action::DataUpdated(0, data)).unwrap();
        s
    }

    fn displayed_ids(s: &EntityTableScreen) -> Vec<String> {
        s.table.displayed().iter().map(|r| r.record.id().to_owned()).collect()
    }

    #[test]
    fn data_for_other_views_is_ignored() {
        let mut s = screen(None);
        s.update(&Action::DataUpdated(1, customers())).unwrap();
        assert!(s.table.data().is_empty());
        s.update(&Action::DataUpdated(0, customers())).unwrap();
        assert_eq!(s.table.data().len(), 3);
    }

    #[test]
    fn paging_keys_move_between_pages() {
        let mut s = loaded(None, customers());
        assert_eq!(displayed_ids(&s), ["1", "2"]);
        press(&mut s, KeyCode::Char('j'));
        assert_eq!(s.cursor, 1);

        press(&mut s, KeyCode::Char('n'));
        assert_eq!(displayed_ids(&s), ["3"]);
        assert_eq!(s.cursor, 0);
        press(&mut s, KeyCode::Char('n'));
        assert_eq!(s.table.pagination().current_page, 2);

        press(&mut s, KeyCode::Char('p'));
        assert_eq!(s.table.pagination().current_page, 1);
    }

    #[test]
    fn page_size_steps_through_presets() {
        let mut s = loaded(None, customers());
        press(&mut s, KeyCode::Char('+'));
        assert_eq!(s.table.pagination().items_per_page, 5);
        assert_eq!(displayed_ids(&s), ["1", "2", "3"]);
        press(&mut s, KeyCode::Char('+'));
        assert_eq!(s.table.pagination().items_per_page, 10);
        press(&mut s, KeyCode::Char('-'));
        press(&mut s, KeyCode::Char('-'));
        // Already at the smallest preset.
        assert_eq!(s.table.pagination().items_per_page, 5);
    }

    #[test]
    fn search_filters_without_debouncer() {
        let mut s = loaded(None, customers());
        press(&mut s, KeyCode::Char('/'));
        assert!(s.captures_input());
        typed(&mut s, "c0");
        assert_eq!(s.table.settled_term(), "c0");
        assert_eq!(s.table.filtered().len(), 2);

        press(&mut s, KeyCode::Esc);
        assert!(!s.captures_input());
        assert_eq!(s.table.raw_term(), "");
        assert_eq!(s.table.filtered().len(), 3);
    }

    #[test]
    fn settled_term_from_debouncer_is_applied() {
        let mut s = loaded(None, customers());
        s.update(&Action::SearchSettled(0, "k03".into())).unwrap();
        assert_eq!(displayed_ids(&s), ["3"]);
    }

    #[test]
    fn sort_cycles_columns_and_flips() {
        let mut s = loaded(None, customers());
        press(&mut s, KeyCode::Char('s'));
        assert_eq!(s.table.sort(), Some(&SortSpec::asc("code")));
        press(&mut s, KeyCode::Char('s'));
        assert_eq!(s.table.sort(), Some(&SortSpec::asc("name")));
        press(&mut s, KeyCode::Char('o'));
        assert_eq!(s.table.sort(), Some(&SortSpec::desc("name")));
        press(&mut s, KeyCode::Char('s'));
        assert_eq!(s.table.sort(), Some(&SortSpec::desc("code")));
        assert_eq!(displayed_ids(&s), ["3", "2"]);
    }

    #[test]
    fn selection_keys() {
        let mut s = loaded(None, customers());
        press(&mut s, KeyCode::Char(' '));
        assert!(s.table.selection().is_selected("1"));
        assert_eq!(s.cursor, 1);

        press(&mut s, KeyCode::Char('a'));
        assert_eq!(s.table.selection().ids(), ["1", "2"]);
        press(&mut s, KeyCode::Char('a'));
        assert!(s.table.selection().is_empty());
    }

    #[test]
    fn delete_targets_selection_or_cursor() {
        let mut s = loaded(None, customers());
        press(&mut s, KeyCode::Char('j'));
        match press(&mut s, KeyCode::Char('d')) {
            Some(Action::RequestDelete(0, ids)) => assert_eq!(ids, ["2"]),
            other => panic!("unexpected {other:?}"),
        }

        press(&mut s, KeyCode::Char('a'));
        match press(&mut s, KeyCode::Char('d')) {
            Some(Action::RequestDelete(0, ids)) => assert_eq!(ids, ["1", "2"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn delete_on_empty_table_does_nothing() {
        let mut s = screen(None);
        assert!(press(&mut s, KeyCode::Char('d')).is_none());
    }

    #[test]
    fn refresh_requests_reload() {
        let mut s = loaded(None, customers());
        assert!(matches!(
            press(&mut s, KeyCode::Char('r')),
            Some(Action::RequestRefresh(0))
        ));
    }

    #[test]
    fn enter_expands_tree_nodes() {
        let mut s = loaded(Some("parentId"), categories());
        assert_eq!(displayed_ids(&s), ["1", "3"]);
        press(&mut s, KeyCode::Enter);
        assert_eq!(displayed_ids(&s), ["1", "2"]);
        assert!(s.table.is_expanded("1"));
        press(&mut s, KeyCode::Enter);
        assert_eq!(displayed_ids(&s), ["1", "3"]);
    }

    #[test]
    fn column_panel_toggles_and_pins() {
        let mut s = loaded(None, customers());
        press(&mut s, KeyCode::Char('c'));
        assert!(s.captures_input());

        press(&mut s, KeyCode::Char('v'));
        assert_eq!(s.table.ordered_columns().len(), 1);
        press(&mut s, KeyCode::Char('v'));
        assert_eq!(s.table.ordered_columns().len(), 2);

        press(&mut s, KeyCode::Char('j'));
        press(&mut s, KeyCode::Char('p'));
        let ids: Vec<_> = s.table.ordered_columns().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, ["name", "code"]);
        assert_eq!(s.panel_cursor, 0);

        press(&mut s, KeyCode::Char('>'));
        assert_eq!(s.table.columns()[1].width, 176);

        press(&mut s, KeyCode::Char('R'));
        assert_eq!(s.table.columns(), view(None).columns.as_slice());

        press(&mut s, KeyCode::Esc);
        assert!(!s.captures_input());
    }

    #[test]
    fn load_state_drives_busy_flag() {
        let mut s = screen(None);
        s.update(&Action::LoadStateChanged(
            0,
            LoadState {
                loading: true,
                editing: false,
            },
        ))
        .unwrap();
        assert!(s.busy);
        s.update(&Action::LoadStateChanged(0, LoadState::default())).unwrap();
        assert!(!s.busy);
    }

    #[test]
    fn footer_describes_page() {
        let s = loaded(None, customers());
        assert_eq!(pagination_text(&s.table), "Page 1/2 · rows 1-2 of 3 · 2/page");
        assert_eq!(pagination_text(&screen(None).table), "No records");
    }
}
