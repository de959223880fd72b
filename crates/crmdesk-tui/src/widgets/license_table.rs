//! License table renderer.
//!
//! Draws canonical license rows in the order it is given, marks the sorted
//! column, and maps mouse positions back to header columns and rows. It
//! never sorts: header clicks become [`Action::SortLicenses`] and row clicks
//! become [`Action::OpenLicense`], both handled by the caller.
//!
//! [`Action::SortLicenses`]: crate::action::Action::SortLicenses
//! [`Action::OpenLicense`]: crate::action::Action::OpenLicense

use std::rc::Rc;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, HighlightSpacing, Paragraph, Row, Table, TableState};

use crmdesk_core::display;
use crmdesk_core::{CanonicalLicenseRow, SortColumn, SortState};

use crate::theme;

/// Columns in display order.
pub const COLUMNS: [SortColumn; 7] = [
    SortColumn::Customer,
    SortColumn::ProductId,
    SortColumn::Description,
    SortColumn::ExpiryDate,
    SortColumn::LicenseType,
    SortColumn::Value,
    SortColumn::PurchaseOrderId,
];

const WIDTHS: [Constraint; 7] = [
    Constraint::Fill(3),    // customer
    Constraint::Fill(2),    // product id
    Constraint::Fill(5),    // description
    Constraint::Length(13), // expiry
    Constraint::Fill(2),    // type
    Constraint::Length(14), // value
    Constraint::Fill(2),    // PO
];

const COLUMN_SPACING: u16 = 1;

pub const LOADING: &str = "Loading…";
pub const EMPTY: &str = "No records";

fn header_label(column: SortColumn) -> &'static str {
    match column {
        SortColumn::Customer => "Customer",
        SortColumn::ProductId => "Product ID",
        SortColumn::Description => "Description",
        SortColumn::ExpiryDate => "Expiry",
        SortColumn::LicenseType => "Type",
        SortColumn::Value => "Value",
        SortColumn::PurchaseOrderId => "PO",
    }
}

/// What a mouse position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Header(SortColumn),
    /// Index into the displayed rows.
    Row(usize),
}

/// Inputs for one render of the license table.
pub struct LicenseTable<'a> {
    pub rows: &'a [CanonicalLicenseRow],
    pub loading: bool,
    pub sort: SortState,
    pub currency: &'a str,
}

impl LicenseTable<'_> {
    /// Text of the single spanning placeholder row, if one replaces the body.
    pub fn placeholder(&self) -> Option<&'static str> {
        if self.loading {
            Some(LOADING)
        } else if self.rows.is_empty() {
            Some(EMPTY)
        } else {
            None
        }
    }

    fn header(&self) -> Row<'static> {
        let cells = COLUMNS.iter().map(|&column| {
            if column == self.sort.column {
                let label = format!("{} {}", header_label(column), self.sort.direction.arrow());
                Cell::from(label).style(theme::table_header_sorted())
            } else {
                Cell::from(header_label(column)).style(theme::table_header())
            }
        });
        Row::new(cells)
    }

    fn body(&self) -> Vec<Row<'static>> {
        self.rows
            .iter()
            .map(|r| {
                let cells = [
                    Cell::from(r.customer.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(r.product_id.clone()),
                    Cell::from(r.single_line_description()),
                    Cell::from(display::short_date(&r.expiry_date)),
                    Cell::from(r.license_type.clone()).style(Style::default().fg(theme::CORAL)),
                    Cell::from(
                        Line::from(display::money(r.value, self.currency)).alignment(Alignment::Right),
                    )
                    .style(Style::default().fg(theme::ELECTRIC_YELLOW)),
                    Cell::from(r.purchase_order_id.clone()),
                ];
                Row::new(cells).style(theme::table_row())
            })
            .collect()
    }

    /// Render into `area`. `state` carries selection and scroll offset.
    pub fn render(&self, frame: &mut Frame, area: Rect, state: &mut TableState) {
        let placeholder = self.placeholder();
        let body = if placeholder.is_some() {
            Vec::new()
        } else {
            self.body()
        };

        let table = Table::new(body, WIDTHS)
            .header(self.header())
            .column_spacing(COLUMN_SPACING)
            .highlight_spacing(HighlightSpacing::Never)
            .row_highlight_style(theme::table_selected());
        frame.render_stateful_widget(table, area, state);

        if let Some(text) = placeholder {
            if area.height > 1 {
                let row = Rect::new(area.x, area.y + 1, area.width, 1);
                let line = Line::from(Span::styled(text, theme::placeholder())).alignment(Alignment::Center);
                frame.render_widget(Paragraph::new(line), row);
            }
        }
    }
}

/// Column rectangles for a table drawn into `area`.
fn column_areas(area: Rect) -> Rc<[Rect]> {
    Layout::horizontal(WIDTHS)
        .spacing(COLUMN_SPACING)
        .split(Rect::new(area.x, area.y, area.width, 1))
}

/// Map a terminal position to the header column or body row under it.
///
/// `offset` is the table's scroll offset and `row_count` the number of
/// displayed rows; positions past the last row hit nothing.
pub fn hit_test(area: Rect, offset: usize, row_count: usize, x: u16, y: u16) -> Option<Hit> {
    if x < area.x || x >= area.right() || y < area.y || y >= area.bottom() {
        return None;
    }
    if y == area.y {
        return column_areas(area)
            .iter()
            .position(|col| x >= col.x && x < col.right())
            .and_then(|i| COLUMNS.get(i).copied())
            .map(Hit::Header);
    }
    let index = offset + usize::from(y - area.y - 1);
    (index < row_count).then_some(Hit::Row(index))
}
