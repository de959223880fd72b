//! Dashboard screen -- summary cards, conversion rates, funnel and expiry.
//!
//! Layout:
//! ┌─ Dashboard [updated 14:02:11] ───────────────────────────────────────┐
//! │ ┌─ Leads ──┐ ┌─ Quotations ┐ ┌─ Orders ─┐ ┌─ Expiring ─┐            │
//! │ └──────────┘ └─────────────┘ └──────────┘ └────────────┘            │
//! │ Conversion  lead→quote 12.5%  quote→order 30.0%  overall 3.8%        │
//! │ ┌─ Sales Funnel (month) ──────────┐ ┌─ License Expiry 2025 ───────┐ │
//! │ └─────────────────────────────────┘ └─────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────────┘

use std::sync::Arc;

use color_eyre::eyre::Result;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};

use crmdesk_core::display;
use crmdesk_core::{LicenseExpirySummary, PeriodMetric, ReportSnapshot, SalesFunnelSummary};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct DashboardScreen {
    focused: bool,
    snapshot: Arc<ReportSnapshot>,
    loading: bool,
    currency: String,
}

impl DashboardScreen {
    pub fn new(currency: &str) -> Self {
        Self {
            focused: false,
            snapshot: Arc::new(ReportSnapshot::default()),
            loading: false,
            currency: currency.to_owned(),
        }
    }

    fn updated_str(&self) -> String {
        self.snapshot.refreshed_at.map_or_else(
            || "never".into(),
            |at| {
                at.with_timezone(&chrono::Local)
                    .format("updated %H:%M:%S")
                    .to_string()
            },
        )
    }

    fn render_card(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
        let block = Block::default()
            .title(Span::styled(format!(" {title} "), theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect) {
        let Some(ref d) = self.snapshot.dashboard else {
            return;
        };
        let cols = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
        let p = &d.current_period;

        Self::render_card(frame, cols[0], "Leads", metric_lines(p.leads, d.totals.leads));
        Self::render_card(
            frame,
            cols[1],
            "Quotations",
            metric_lines(p.quotations, d.totals.quotations),
        );
        Self::render_card(frame, cols[2], "Orders", metric_lines(p.orders, d.totals.orders));
        Self::render_card(
            frame,
            cols[3],
            "Expiring",
            vec![
                Line::from(Span::styled(
                    display::count(p.expiring_licenses),
                    Style::default()
                        .fg(theme::ELECTRIC_YELLOW)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled("licenses this window", theme::key_hint())),
            ],
        );
    }

    fn render_rates(&self, frame: &mut Frame, area: Rect) {
        let Some(ref d) = self.snapshot.dashboard else {
            return;
        };
        let r = &d.conversion_rates;
        let value = |rate: f64| Span::styled(display::percent(rate), theme::key_hint_key());
        let line = Line::from(vec![
            Span::styled(" Conversion  ", theme::title_style()),
            Span::styled("lead→quote ", theme::key_hint()),
            value(r.lead_to_quotation),
            Span::styled("  quote→order ", theme::key_hint()),
            value(r.quotation_to_order),
            Span::styled("  overall ", theme::key_hint()),
            value(r.overall),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_funnel(frame: &mut Frame, area: Rect, funnel: &SalesFunnelSummary) {
        let block = Block::default()
            .title(Span::styled(
                format!(" Sales Funnel ({}) ", funnel.group_by),
                theme::title_style(),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let header = Row::new(["Period", "Leads", "Quotes", "Orders", "L→Q", "Q→O"])
            .style(theme::table_header());
        let rows = funnel.breakdown.iter().map(|p| {
            Row::new([
                Cell::from(p.label.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                Cell::from(display::count(p.leads)),
                Cell::from(display::count(p.quotations)),
                Cell::from(display::count(p.orders)),
                Cell::from(display::percent(p.conversion_rates.lead_to_quotation)),
                Cell::from(display::percent(p.conversion_rates.quotation_to_order)),
            ])
            .style(theme::table_row())
        });
        let widths = [
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Length(7),
        ];
        frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
    }

    fn render_expiry(&self, frame: &mut Frame, area: Rect, expiry: &LicenseExpirySummary) {
        let block = Block::default()
            .title(Span::styled(
                format!(" License Expiry {} ", expiry.year),
                theme::title_style(),
            ))
            .title_bottom(
                Line::from(Span::styled(
                    format!(
                        " {} licenses · {} ",
                        display::count(expiry.totals.count),
                        display::money(expiry.totals.value, &self.currency)
                    ),
                    theme::key_hint(),
                ))
                .alignment(Alignment::Right),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let header = Row::new(["Month", "Count", "Value", "By Type"]).style(theme::table_header());
        let rows = expiry.monthly.iter().map(|m| {
            let value: f64 = m.by_type.values().map(|t| t.value).sum();
            let types = m
                .by_type
                .iter()
                .map(|(kind, t)| format!("{kind} {}", t.count))
                .collect::<Vec<_>>()
                .join(" · ");
            Row::new([
                Cell::from(m.label.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                Cell::from(m.licenses.len().to_string()),
                Cell::from(display::money(value, &self.currency))
                    .style(Style::default().fg(theme::ELECTRIC_YELLOW)),
                Cell::from(types).style(Style::default().fg(theme::CORAL)),
            ])
            .style(theme::table_row())
        });
        let widths = [
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Fill(1),
        ];
        frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
    }
}

/// Card body for one entity: current count, growth, lifetime total.
fn metric_lines(metric: PeriodMetric, total: u64) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            display::count(metric.count),
            Style::default()
                .fg(theme::NEON_CYAN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!("{:+.1}%", metric.growth), theme::growth(metric.growth)),
            Span::styled(" vs last period", theme::key_hint()),
        ]),
        Line::from(Span::styled(
            format!("{} total", display::count(total)),
            theme::key_hint(),
        )),
    ]
}

impl Component for DashboardScreen {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ReportsUpdated(snapshot) => self.snapshot = Arc::clone(snapshot),
            Action::LoadingChanged(flag) => self.loading = *flag,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title_line = Line::from(vec![
            Span::styled(" Dashboard ", theme::title_style()),
            Span::styled(
                format!(" [{}] ", self.updated_str()),
                Style::default().fg(theme::BORDER_GRAY),
            ),
        ]);
        let block = Block::default()
            .title(title_line)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.snapshot.is_empty() {
            let text = if self.loading {
                "Loading reports…"
            } else {
                "No report data yet. Press r to refresh."
            };
            let line = Line::from(Span::styled(text, theme::placeholder())).alignment(Alignment::Center);
            frame.render_widget(Paragraph::new(line), inner);
            return;
        }

        let rows = Layout::vertical([
            Constraint::Length(5), // cards
            Constraint::Length(1), // conversion
            Constraint::Min(4),    // funnel | expiry
        ])
        .split(inner);

        self.render_cards(frame, rows[0]);
        self.render_rates(frame, rows[1]);

        let body = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);
        if let Some(ref funnel) = self.snapshot.sales_funnel {
            Self::render_funnel(frame, body[0], funnel);
        }
        if let Some(ref expiry) = self.snapshot.license_expiry {
            self.render_expiry(frame, body[1], expiry);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
