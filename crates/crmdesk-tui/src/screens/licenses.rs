//! Licenses screen -- sortable expiring-license table with a detail panel.

use std::cell::Cell;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, TableState, Wrap};

use crmdesk_core::display;
use crmdesk_core::{CanonicalLicenseRow, SortState, sort_rows};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::license_table::{self, COLUMNS, Hit, LicenseTable};

pub struct LicensesScreen {
    focused: bool,
    /// Displayed rows, already in sort order.
    rows: Arc<Vec<CanonicalLicenseRow>>,
    loading: bool,
    sort: SortState,
    table_state: TableState,
    currency: String,
    detail: Option<Box<CanonicalLicenseRow>>,
    /// `s` pressed, waiting for the column digit.
    sort_chord: bool,
    /// Last drawn table area and scroll offset, for mouse hit-testing.
    table_area: Cell<Rect>,
    table_offset: Cell<usize>,
}

impl LicensesScreen {
    pub fn new(currency: &str) -> Self {
        Self {
            focused: false,
            rows: Arc::new(Vec::new()),
            loading: false,
            sort: SortState::default(),
            table_state: TableState::default(),
            currency: currency.to_owned(),
            detail: None,
            sort_chord: false,
            table_area: Cell::new(Rect::default()),
            table_offset: Cell::new(0),
        }
    }

    fn load(&mut self, mut rows: Vec<CanonicalLicenseRow>) {
        sort_rows(&mut rows, self.sort.column, self.sort.direction);
        self.rows = Arc::new(rows);
        self.clamp_selection();
    }

    fn resort(&mut self) {
        let rows = Arc::make_mut(&mut self.rows);
        sort_rows(rows, self.sort.column, self.sort.direction);
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_row(&self) -> Option<&CanonicalLicenseRow> {
        self.rows.get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        if self.rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(self.rows.len() - 1)));
        }
    }

    fn clamp_selection(&mut self) {
        self.select(self.selected_index());
    }

    fn move_selection(&mut self, delta: isize) {
        self.select(self.selected_index().saturating_add_signed(delta));
    }

    fn open_selected(&self) -> Option<Action> {
        self.selected_row()
            .map(|row| Action::OpenLicense(Box::new(row.clone())))
    }

    fn handle_chord(key: KeyEvent) -> Option<Action> {
        let KeyCode::Char(c @ '1'..='7') = key.code else {
            return None;
        };
        let idx = c.to_digit(10).and_then(|d| usize::try_from(d).ok())?;
        COLUMNS.get(idx - 1).map(|&column| Action::SortLicenses(column))
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, row: &CanonicalLicenseRow) {
        let block = Block::default()
            .title(format!(" {}  ·  {} ", row.customer, row.product_id))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let field = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("  {label:<14}"), theme::key_hint()),
                Span::styled(value, Style::default().fg(theme::DIM_WHITE)),
            ])
        };
        let expiry = row.expiry().map_or_else(
            || row.expiry_date.clone(),
            |at| at.format("%Y-%m-%d").to_string(),
        );
        let mut lines = vec![
            field("Customer", row.customer.clone()),
            field("Product ID", row.product_id.clone()),
            field("Expiry", expiry),
            field("Type", row.license_type.clone()),
            field("Value", display::money(row.value, &self.currency)),
            field("Purchase Order", row.purchase_order_id.clone()),
            Line::from(""),
            Line::from(Span::styled("  Description", theme::key_hint())),
        ];
        lines.extend(
            row.description
                .lines()
                .map(|l| Line::from(Span::styled(format!("  {l}"), theme::table_row()))),
        );
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

impl Component for LicensesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.sort_chord {
            self.sort_chord = false;
            return Ok(Self::handle_chord(key));
        }

        if self.detail.is_some() {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Enter => Some(Action::CloseDetail),
                _ => None,
            });
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(None)
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select(0);
                Ok(None)
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select(self.rows.len().saturating_sub(1));
                Ok(None)
            }
            KeyCode::Enter => Ok(self.open_selected()),
            KeyCode::Char('s') => {
                self.sort_chord = true;
                Ok(None)
            }
            KeyCode::Char('e') => Ok(Some(Action::ExportCsv(Arc::clone(&self.rows)))),
            KeyCode::Char('p') => Ok(Some(Action::PrintLicenses(Arc::clone(&self.rows)))),
            _ => Ok(None),
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        // One action per click: ignore the release and drag events
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) || self.detail.is_some() {
            return Ok(None);
        }
        let hit = license_table::hit_test(
            self.table_area.get(),
            self.table_offset.get(),
            if self.loading { 0 } else { self.rows.len() },
            mouse.column,
            mouse.row,
        );
        Ok(match hit {
            Some(Hit::Header(column)) => Some(Action::SortLicenses(column)),
            Some(Hit::Row(idx)) => {
                self.select(idx);
                self.open_selected()
            }
            None => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ReportsUpdated(snapshot) => self.load(snapshot.license_rows()),
            Action::LoadingChanged(flag) => self.loading = *flag,
            Action::SortLicenses(column) => {
                self.sort.toggle(*column);
                self.resort();
            }
            Action::OpenLicense(row) => self.detail = Some(row.clone()),
            Action::CloseDetail => self.detail = None,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" Licenses ({}) ", self.rows.len());
        let sort_hint = format!(" sorted by {} {} ", self.sort.column, self.sort.direction.arrow());
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .title_bottom(Line::from(Span::styled(sort_hint, theme::key_hint())).right_aligned())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (table_area, detail_area) = if self.detail.is_some() {
            let chunks =
                Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).split(inner);
            (chunks[0], Some(chunks[1]))
        } else {
            (inner, None)
        };

        let layout = Layout::vertical([Constraint::Min(2), Constraint::Length(1)]).split(table_area);

        let table = LicenseTable {
            rows: &self.rows,
            loading: self.loading,
            sort: self.sort,
            currency: &self.currency,
        };
        let mut state = self.table_state.clone();
        table.render(frame, layout[0], &mut state);
        self.table_area.set(layout[0]);
        self.table_offset.set(state.offset());

        let hints = Line::from(vec![
            Span::styled(" s", theme::key_hint_key()),
            Span::styled("+1-7 sort  ", theme::key_hint()),
            Span::styled("Enter", theme::key_hint_key()),
            Span::styled(" detail  ", theme::key_hint()),
            Span::styled("e", theme::key_hint_key()),
            Span::styled(" export csv  ", theme::key_hint()),
            Span::styled("p", theme::key_hint_key()),
            Span::styled(" print", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);

        if let (Some(area), Some(row)) = (detail_area, self.detail.as_deref()) {
            self.render_detail(frame, area, row);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.sort_chord || self.detail.is_some()
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use crmdesk_core::{SortColumn, SortDirection};
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(customer: &str, expiry: &str, value: f64) -> CanonicalLicenseRow {
        CanonicalLicenseRow {
            customer: customer.into(),
            product_id: format!("P-{customer}"),
            expiry_date: expiry.into(),
            value,
            ..CanonicalLicenseRow::default()
        }
    }

    fn screen() -> LicensesScreen {
        let mut screen = LicensesScreen::new("$");
        screen.load(vec![
            row("beta", "2025-06-01", 10.0),
            row("Alpha", "2025-02-01", 30.0),
            row("gamma", "2025-04-01", 20.0),
        ]);
        screen.table_area.set(Rect::new(0, 0, 100, 10));
        screen
    }

    fn customers(screen: &LicensesScreen) -> Vec<&str> {
        screen.rows.iter().map(|r| r.customer.as_str()).collect()
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn apply(screen: &mut LicensesScreen, action: Option<Action>) {
        if let Some(action) = action {
            screen.update(&action).unwrap();
        }
    }

    #[test]
    fn rows_load_in_default_expiry_order() {
        assert_eq!(customers(&screen()), vec!["Alpha", "gamma", "beta"]);
    }

    #[test]
    fn header_click_emits_single_sort() {
        let mut screen = screen();
        let down = screen
            .handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 0, 0))
            .unwrap();
        let up = screen
            .handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0))
            .unwrap();
        let drag = screen
            .handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0))
            .unwrap();

        assert!(matches!(down, Some(Action::SortLicenses(SortColumn::Customer))));
        assert!(up.is_none());
        assert!(drag.is_none());
    }

    #[test]
    fn sort_toggles_direction_on_same_column() {
        let mut screen = screen();
        screen.update(&Action::SortLicenses(SortColumn::Customer)).unwrap();
        assert_eq!(customers(&screen), vec!["Alpha", "beta", "gamma"]);

        screen.update(&Action::SortLicenses(SortColumn::Customer)).unwrap();
        assert_eq!(screen.sort.direction, SortDirection::Descending);
        assert_eq!(customers(&screen), vec!["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn sort_chord_selects_column_by_number() {
        let mut screen = screen();
        assert!(screen.handle_key_event(key('s')).unwrap().is_none());
        assert!(screen.captures_input());

        let action = screen.handle_key_event(key('6')).unwrap();
        assert!(matches!(action, Some(Action::SortLicenses(SortColumn::Value))));
        assert!(!screen.captures_input());

        apply(&mut screen, action);
        assert_eq!(customers(&screen), vec!["beta", "gamma", "Alpha"]);
    }

    #[test]
    fn sort_chord_cancelled_by_other_key() {
        let mut screen = screen();
        screen.handle_key_event(key('s')).unwrap();
        assert!(screen.handle_key_event(key('x')).unwrap().is_none());
        assert!(screen.handle_key_event(key('9')).unwrap().is_none());
        assert!(!screen.captures_input());
    }

    #[test]
    fn row_click_opens_detail() {
        let mut screen = screen();
        let action = screen
            .handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 5, 2))
            .unwrap();
        let Some(Action::OpenLicense(ref opened)) = action else {
            panic!("expected OpenLicense, got {action:?}");
        };
        assert_eq!(opened.customer, "gamma");

        apply(&mut screen, action);
        assert!(screen.captures_input());
        let close = screen
            .handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        apply(&mut screen, close);
        assert!(screen.detail.is_none());
    }

    #[test]
    fn export_keys_carry_displayed_rows() {
        let mut screen = screen();
        let Some(Action::ExportCsv(rows)) = screen.handle_key_event(key('e')).unwrap() else {
            panic!("expected ExportCsv");
        };
        assert!(Arc::ptr_eq(&rows, &screen.rows));
        assert!(matches!(
            screen.handle_key_event(key('p')).unwrap(),
            Some(Action::PrintLicenses(_))
        ));
    }

    #[test]
    fn selection_clamped_when_rows_shrink() {
        let mut screen = screen();
        screen.select(2);
        screen.load(vec![row("solo", "2025-01-01", 1.0)]);
        assert_eq!(screen.table_state.selected(), Some(0));
        screen.load(Vec::new());
        assert_eq!(screen.table_state.selected(), None);
    }
}
