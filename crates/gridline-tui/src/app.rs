//! Application core: event loop, view tabs and action dispatch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gridline_core::{ColumnStore, DynamicController, MutationOutcome, ViewDefinition};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel, ViewIdx};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::centered_rect;

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// One configured view and the controller that owns its data.
pub struct ViewHandle {
    pub definition: ViewDefinition,
    pub controller: DynamicController,
}

/// Top-level application state and event loop.
pub struct App {
    views: Vec<ViewHandle>,
    /// One screen per view, same order.
    screens: Vec<Box<dyn Component>>,
    active: ViewIdx,
    running: bool,
    help_visible: bool,
    /// Profile name shown in the status bar.
    profile: String,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Cancels every data bridge task.
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(views: Vec<ViewHandle>, store: &Arc<dyn ColumnStore>, profile: String) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let definitions: Vec<ViewDefinition> = views.iter().map(|v| v.definition.clone()).collect();
        let screens = create_screens(&definitions, store, &action_tx);

        Self {
            views,
            screens,
            active: 0,
            running: true,
            help_visible: false,
            profile,
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
        }
    }

    /// Open on the named view instead of the first one.
    pub fn start_on(&mut self, name: &str) -> bool {
        let Some(idx) = self.views.iter().position(|v| v.definition.name == name) else {
            return false;
        };
        self.active = idx;
        true
    }

    fn focus_active(&mut self) {
        if let Some(screen) = self.screens.get_mut(self.active) {
            screen.set_focused(true);
        }
    }

    fn spawn_bridges(&self) {
        for (idx, view) in self.views.iter().enumerate() {
            let controller = view.controller.clone();
            let tx = self.action_tx.clone();
            let cancel = self.data_cancel.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(idx, controller, tx, cancel).await;
            });
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        let (width, height) = tui.size().unwrap_or((80, 24));
        debug!(width, height, "terminal entered");
        self.focus_active();
        self.spawn_bridges();

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(views = self.views.len(), "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        drop(events);
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// everything else goes to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Confirmation dialog captures all input
        if self.pending_confirm.is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => Ok(Some(Action::ConfirmYes)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Ok(Some(Action::ConfirmNo)),
                _ => Ok(None),
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        let count = self.screens.len();
        let Some(screen) = self.screens.get_mut(self.active) else {
            return Ok(match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            });
        };
        if screen.captures_input() {
            return screen.handle_key_event(key);
        }

        match key.code {
            KeyCode::Char('q') => Ok(Some(Action::Quit)),
            KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
            KeyCode::Tab => Ok(Some(Action::NextView)),
            KeyCode::BackTab => Ok(Some(Action::PrevView)),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c.to_digit(10).and_then(|n| usize::try_from(n).ok()).unwrap_or(1) - 1;
                Ok((idx < count).then_some(Action::SwitchView(idx)))
            }
            _ => screen.handle_key_event(key),
        }
    }

    /// Process a single action: update app state and propagate to screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(w, h) => debug!(w, h, "terminal resized"),

            Action::SwitchView(target) => self.switch_view(*target),
            Action::NextView => {
                let count = self.screens.len().max(1);
                self.switch_view((self.active + 1) % count);
            }
            Action::PrevView => {
                let count = self.screens.len().max(1);
                self.switch_view((self.active + count - 1) % count);
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Render => {}

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, created)| created.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                self.broadcast(action)?;
            }

            // Data updates go to every screen; each keeps only its own view.
            Action::DataUpdated(..)
            | Action::LoadStateChanged(..)
            | Action::SearchSettled(..)
            | Action::ClearSelection(_) => self.broadcast(action)?,

            Action::RequestRefresh(view) => self.refresh(*view),

            Action::RequestDelete(view, ids) => {
                self.action_tx
                    .send(Action::ShowConfirm(ConfirmAction::DeleteRecords {
                        view: *view,
                        ids: ids.clone(),
                    }))?;
            }

            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),
            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm)?;
                }
            }
            Action::ConfirmNo => self.pending_confirm = None,

            Action::Notify(n) => self.notification = Some((n.clone(), Instant::now())),
            Action::DismissNotification => self.notification = None,
        }

        Ok(())
    }

    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in &mut self.screens {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn switch_view(&mut self, target: ViewIdx) {
        if target == self.active || target >= self.screens.len() {
            return;
        }
        debug!(from = self.active, to = target, "switching view");
        if let Some(screen) = self.screens.get_mut(self.active) {
            screen.set_focused(false);
        }
        self.active = target;
        if let Some(screen) = self.screens.get_mut(self.active) {
            screen.set_focused(true);
        }
    }

    // ── Command execution ─────────────────────────────────────────

    fn refresh(&self, view: ViewIdx) {
        let Some(handle) = self.views.get(view) else {
            return;
        };
        let note = Notification::info(format!("Refreshing {}", handle.definition.name));
        let _ = self.action_tx.send(Action::Notify(note));
        let controller = handle.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.refresh().await {
                warn!(view, error = %e, "refresh failed");
                let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
            }
        });
    }

    fn execute_confirm(&self, confirm: ConfirmAction) -> Result<()> {
        match confirm {
            ConfirmAction::DeleteRecords { view, ids } => {
                let Some(handle) = self.views.get(view) else {
                    return Ok(());
                };
                self.action_tx.send(Action::ClearSelection(view))?;

                let controller = handle.controller.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let outcomes = controller.delete_many(&ids).await;
                    for (id, outcome) in ids.iter().zip(&outcomes) {
                        if !outcome.success {
                            warn!(view, id = %id, message = %outcome.message, "delete rejected");
                        }
                    }
                    if let Some(notification) = delete_summary(&outcomes) {
                        let _ = tx.send(Action::Notify(notification));
                    }
                });
            }
        }
        Ok(())
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        match self.screens.get(self.active) {
            Some(screen) => screen.render(frame, layout[0]),
            None => render_empty(frame, layout[0]),
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays: last = topmost
        if let Some((ref notif, _)) = self.notification {
            render_notification(frame, area, notif);
        }
        if let Some(ref confirm) = self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = self
            .screens
            .iter()
            .enumerate()
            .map(|(i, screen)| {
                let style = if i == self.active {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", i + 1, screen.id()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(self.active);
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" ● ", Style::default().fg(theme::SUCCESS_GREEN)),
            Span::styled(self.profile.as_str(), Style::default().fg(theme::DIM_WHITE)),
            Span::styled(" │ ? help  Tab next view  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// One toast for a batch of deletes.
fn delete_summary(outcomes: &[MutationOutcome]) -> Option<Notification> {
    let total = outcomes.len();
    let failed = outcomes.iter().filter(|o| !o.success).count();
    match outcomes {
        [] => None,
        [single] => Some(Notification::from_outcome(single)),
        [.., last] if failed == 0 => Some(Notification::success(format!(
            "{} ({total} records)",
            last.message
        ))),
        _ => Some(Notification::error(format!("{failed} of {total} deletes failed"))),
    }
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("  No views configured.", theme::title_style())),
        Line::from(Span::styled(
            "  Declare a [views.<name>] table in the config file.",
            theme::key_hint(),
        )),
    ];
    frame.render_widget(Paragraph::new(text), area);
}

fn help_line(key: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
        Span::styled(text, theme::key_hint()),
    ])
}

fn help_heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(format!("  {text}"), Style::default().fg(theme::NEON_CYAN)))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered_rect(area, 60, 27);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let help_text = vec![
        help_heading("Navigation"),
        help_line("1-9 Tab", "Switch view"),
        help_line("j/k ↑/↓", "Move up/down"),
        help_line("n/p", "Next / previous page"),
        help_line("+/-", "Rows per page"),
        help_line("Enter", "Expand / collapse"),
        help_line("e/E", "Expand / collapse all"),
        help_line("i", "Record details"),
        Line::from(""),
        help_heading("Table"),
        help_line("/", "Search"),
        help_line("s", "Sort by next column"),
        help_line("o", "Flip sort order"),
        help_line("c", "Column panel"),
        help_line("space", "Select row"),
        help_line("a", "Select page"),
        help_line("Esc", "Clear selection"),
        Line::from(""),
        help_heading("Data"),
        help_line("d", "Delete selected"),
        help_line("r", "Refresh"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("                 Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered_rect(area, 50, 5);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use gridline_core::{
        AuthSettings, ColumnConfig, DynamicService, EntityEndpoints, Language, MemoryColumnStore,
        ServiceConfig, TlsVerification,
    };
    use indexmap::IndexMap;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn definition(name: &str) -> ViewDefinition {
        ViewDefinition {
            name: name.into(),
            endpoints: EntityEndpoints::conventional(name),
            wire_fields: IndexMap::new(),
            searchable: vec!["name".into()],
            tree_parent: None,
            items_per_page: 10,
            default_sort: None,
            columns: vec![ColumnConfig::new("name", 160, 0).labeled("Name")],
        }
    }

    /// An app whose controllers point at an address nothing listens on.
    fn app(names: &[&str]) -> App {
        let config = ServiceConfig {
            base_url: "http://127.0.0.1:9/api/".parse().unwrap(),
            auth: AuthSettings::Static("tok".into()),
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(1),
            language: Language::En,
        };
        let conn = config.connect().unwrap();
        let views = names
            .iter()
            .map(|name| {
                let definition = definition(name);
                let service = DynamicService::new(
                    definition.name.clone(),
                    &conn,
                    definition.endpoints.clone(),
                    definition.codec(),
                );
                ViewHandle {
                    definition,
                    controller: DynamicController::new(service),
                }
            })
            .collect();
        let store: Arc<dyn ColumnStore> = Arc::new(MemoryColumnStore::new());
        App::new(views, &store, "test".into())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn drain(app: &mut App) -> Vec<Action> {
        let mut out = Vec::new();
        while let Ok(action) = app.action_rx.try_recv() {
            out.push(action);
        }
        out
    }

    #[test]
    fn global_keys_map_to_actions() {
        let mut app = app(&["customer", "category"]);
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::Quit)
        ));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('2'))).unwrap(),
            Some(Action::SwitchView(1))
        ));
        assert!(app.handle_key_event(key(KeyCode::Char('3'))).unwrap().is_none());
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Tab)).unwrap(),
            Some(Action::NextView)
        ));
    }

    #[test]
    fn view_cycling_wraps() {
        let mut app = app(&["customer", "category"]);
        app.process_action(&Action::NextView).unwrap();
        assert_eq!(app.active, 1);
        app.process_action(&Action::NextView).unwrap();
        assert_eq!(app.active, 0);
        app.process_action(&Action::PrevView).unwrap();
        assert_eq!(app.active, 1);
        app.process_action(&Action::SwitchView(7)).unwrap();
        assert_eq!(app.active, 1);
    }

    #[tokio::test]
    async fn search_box_swallows_global_keys() {
        let mut app = app(&["customer"]);
        app.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        assert!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::Quit)
        ));
    }

    #[test]
    fn delete_request_opens_confirmation() {
        let mut app = app(&["customer"]);
        app.process_action(&Action::RequestDelete(0, vec!["7".into()]))
            .unwrap();
        let queued = drain(&mut app);
        assert_eq!(queued.len(), 1);
        app.process_action(&queued[0]).unwrap();
        assert_eq!(
            app.pending_confirm,
            Some(ConfirmAction::DeleteRecords {
                view: 0,
                ids: vec!["7".into()],
            })
        );

        // The dialog captures input until answered.
        assert!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('n'))).unwrap(),
            Some(Action::ConfirmNo)
        ));
        app.process_action(&Action::ConfirmNo).unwrap();
        assert!(app.pending_confirm.is_none());
    }

    #[test]
    fn start_on_named_view() {
        let mut app = app(&["customer", "category"]);
        assert!(app.start_on("category"));
        assert_eq!(app.active, 1);
        assert!(!app.start_on("supplier"));
        assert_eq!(app.active, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_key_waits_before_loading() {
        let mut app = app(&["customer"]);
        app.process_action(&Action::RequestRefresh(0)).unwrap();
        tokio::task::yield_now().await;

        assert!(!app.views[0].controller.is_loading());
        let queued = drain(&mut app);
        assert!(matches!(
            queued.as_slice(),
            [Action::Notify(n)] if n.message == "Refreshing customer"
        ));
    }

    #[test]
    fn batch_delete_yields_one_toast() {
        assert!(delete_summary(&[]).is_none());

        let one = delete_summary(&[MutationOutcome::failed("Record is in use")]).unwrap();
        assert_eq!(one.level, NotificationLevel::Error);
        assert_eq!(one.message, "Record is in use");

        let ok = delete_summary(&[
            MutationOutcome::succeeded("Deleted successfully", None),
            MutationOutcome::succeeded("Deleted successfully", None),
        ])
        .unwrap();
        assert_eq!(ok.level, NotificationLevel::Success);
        assert_eq!(ok.message, "Deleted successfully (2 records)");

        let mixed = delete_summary(&[
            MutationOutcome::succeeded("Deleted successfully", None),
            MutationOutcome::failed("Record is in use"),
            MutationOutcome::succeeded("Deleted successfully", None),
        ])
        .unwrap();
        assert_eq!(mixed.level, NotificationLevel::Error);
        assert_eq!(mixed.message, "1 of 3 deletes failed");
    }

    #[test]
    fn help_overlay_toggles() {
        let mut app = app(&["customer"]);
        app.process_action(&Action::ToggleHelp).unwrap();
        assert!(app.help_visible);
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::ToggleHelp)
        ));
    }

    #[test]
    fn render_shows_tabs_and_toast() {
        let mut app = app(&["customer", "category"]);
        app.process_action(&Action::Notify(Notification::success("Deleted successfully")))
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();

        assert!(text.contains("1 customer"));
        assert!(text.contains("2 category"));
        assert!(text.contains("Deleted successfully"));
        assert!(text.contains("No records"));
    }
}
