//! Application core: event loop, screen management and action dispatch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crmdesk_core::export::{self, BrowserSurface};
use crmdesk_core::{CanonicalLicenseRow, ExportError, RefreshOutcome, ReportsController};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Connection status as seen by the TUI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Settings resolved at startup.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Prefix for monetary values.
    pub currency: String,
    /// CSV exports land here as `licenses.csv`.
    pub export_dir: PathBuf,
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    connection_status: ConnectionStatus,
    /// Mirrors the controller's loading flag.
    loading: bool,
    throbber_state: ThrobberState,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: ReportsController,
    options: AppOptions,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(controller: ReportsController, options: AppOptions) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(&options.currency).into_iter().collect();

        Self {
            active_screen: ScreenId::default(),
            previous_screen: None,
            screens,
            running: true,
            connection_status: ConnectionStatus::default(),
            loading: false,
            throbber_state: ThrobberState::default(),
            help_visible: false,
            action_tx,
            action_rx,
            controller,
            options,
            data_cancel: CancellationToken::new(),
            notification: None,
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        let bridge = {
            let controller = self.controller.clone();
            let cancel = self.data_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
            })
        };

        let mut events = EventReader::spawn();

        info!("TUI event loop started");

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
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
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
            events.set_animating(self.is_animating());
        }

        // Bridge logs out on cancellation
        self.data_cancel.cancel();
        if let Err(e) = bridge.await {
            warn!(error = %e, "data bridge task failed");
        }
        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here unless
    /// the active screen is in a modal sub-state.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let captured = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());

        if !captured {
            match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
                (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
                (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::RequestRefresh)),
                (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
                    let screen = c
                        .to_digit(10)
                        .and_then(|n| u8::try_from(n).ok())
                        .and_then(ScreenId::from_number);
                    if let Some(screen) = screen {
                        return Ok(Some(Action::SwitchScreen(screen)));
                    }
                }
                (KeyModifiers::NONE, KeyCode::Tab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
                }
                (KeyModifiers::NONE, KeyCode::Esc) => return Ok(Some(Action::GoBack)),
                _ => {}
            }
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return Ok(None);
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render | Action::Resize(..) => {}

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, created)| created.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                if self.loading {
                    self.throbber_state.calc_next();
                }
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.previous_screen = Some(self.active_screen);
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Connected => self.connection_status = ConnectionStatus::Connected,

            Action::Disconnected(reason) => {
                self.connection_status = ConnectionStatus::Disconnected;
                self.notify(Notification::error(reason.clone()));
            }

            Action::RequestRefresh => self.refresh(),

            Action::ExportCsv(rows) => self.export_csv(Arc::clone(rows)),

            Action::PrintLicenses(rows) => self.print(Arc::clone(rows)),

            Action::Notify(notification) => self.notify(notification.clone()),

            Action::DismissNotification => self.notification = None,

            // Data updates go to ALL screens so they stay in sync
            Action::ReportsUpdated(_) | Action::LoadingChanged(_) => {
                if let Action::LoadingChanged(flag) = action {
                    self.loading = *flag;
                }
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            // Everything else belongs to the active screen
            Action::SortLicenses(_) | Action::OpenLicense(_) | Action::CloseDetail => {
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether the throbber or a toast needs `Tick` events.
    fn is_animating(&self) -> bool {
        self.loading || self.notification.is_some()
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    // ── Background work ───────────────────────────────────────────

    /// Start a refresh cycle. A cycle already in flight is superseded.
    fn refresh(&mut self) {
        self.notify(Notification::info("Refreshing reports…"));
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notice = match controller.refresh_reports().await {
                RefreshOutcome::Applied => Some(Notification::success("Reports refreshed")),
                RefreshOutcome::Failed(reason) => Some(Notification::error(reason)),
                RefreshOutcome::Superseded => None,
            };
            if let Some(notice) = notice {
                let _ = tx.send(Action::Notify(notice));
            }
        });
    }

    fn export_csv(&self, rows: Arc<Vec<CanonicalLicenseRow>>) {
        let path = self.options.export_dir.join(export::csv::DEFAULT_FILENAME);
        self.run_export(move || {
            let written = export::csv::write(rows.as_slice(), Some(&path))?;
            Ok(format!(
                "Exported {} licenses to {}",
                rows.len(),
                written.display()
            ))
        });
    }

    fn print(&self, rows: Arc<Vec<CanonicalLicenseRow>>) {
        self.run_export(move || {
            export::print::open(rows.as_slice(), &BrowserSurface::default())?;
            Ok(format!("Opened print view for {} licenses", rows.len()))
        });
    }

    /// Run a blocking export off the event loop and toast its outcome.
    fn run_export<F>(&self, job: F)
    where
        F: FnOnce() -> Result<String, ExportError> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notice = match tokio::task::spawn_blocking(job).await {
                Ok(result) => export_notice(result),
                Err(e) => Notification::error(format!("Export task failed: {e}")),
            };
            let _ = tx.send(Action::Notify(notice));
        });
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

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if let Some((ref notif, _)) = self.notification {
            Self::render_notification(frame, area, notif);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let cols = Layout::horizontal([Constraint::Min(1), Constraint::Length(16)]).split(area);

        let connection_indicator = match self.connection_status {
            ConnectionStatus::Connected => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionStatus::Disconnected => {
                Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED))
            }
            ConnectionStatus::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
        };
        let hints = Span::styled(
            " │ r refresh  e export  p print  ? help  q quit",
            theme::key_hint(),
        );
        let line = Line::from(vec![Span::raw(" "), connection_indicator, hints]);
        frame.render_widget(Paragraph::new(line), cols[0]);

        if self.loading {
            let throbber = Throbber::default()
                .label("refreshing")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, cols[1], &mut self.throbber_state.clone());
        }
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 52u16.min(area.width.saturating_sub(4));
        let help_height = 20u16.min(area.height.saturating_sub(4));
        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

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

        let entry = |key: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(desc, theme::key_hint()),
            ])
        };
        let section = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            ))
        };

        let help_text = vec![
            Line::from(""),
            section("Navigation"),
            entry("1-2", "Jump to screen"),
            entry("Tab", "Next screen"),
            entry("j/k ↑/↓", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("Enter", "License detail"),
            entry("Esc", "Back / close"),
            Line::from(""),
            section("Licenses"),
            entry("s 1-7", "Sort by column (again to flip)"),
            entry("click", "Sort by header / open row"),
            entry("e", "Export CSV"),
            entry("p", "Print view"),
            Line::from(""),
            section("Global"),
            entry("r", "Refresh reports"),
            entry("?", "This help"),
            entry("q", "Quit"),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }

    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len.saturating_add(6).clamp(20, 72).min(area.width);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
            NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
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
}

/// Toast for a finished export. An empty row set is a warning, not a failure.
fn export_notice(result: Result<String, ExportError>) -> Notification {
    match result {
        Ok(message) => Notification::success(message),
        Err(ExportError::NoData) => Notification::warning("No licenses to export"),
        Err(e) => {
            warn!(error = %e, "export failed");
            Notification::error(e.to_string())
        }
    }
}
