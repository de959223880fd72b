//! Report command handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use crmdesk_core::display;
use crmdesk_core::{
    DashboardSummary, FunnelPeriod, LicenseExpirySummary, MonthlyExpiry, ReportSnapshot,
    SalesFunnelSummary,
};

use crate::cli::{GlobalOpts, OutputFormat, ReportsArgs, ReportsCommand};
use crate::config::Defaults;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "This Period")]
    current: String,
    #[tabled(rename = "Growth")]
    growth: String,
    #[tabled(rename = "All Time")]
    total: String,
}

#[derive(Tabled)]
struct FunnelRow {
    #[tabled(rename = "Period")]
    label: String,
    #[tabled(rename = "Leads")]
    leads: String,
    #[tabled(rename = "Quotations")]
    quotations: String,
    #[tabled(rename = "Orders")]
    orders: String,
    #[tabled(rename = "Lead→Quote")]
    lead_to_quote: String,
    #[tabled(rename = "Quote→Order")]
    quote_to_order: String,
}

impl From<&FunnelPeriod> for FunnelRow {
    fn from(p: &FunnelPeriod) -> Self {
        Self {
            label: p.label.clone(),
            leads: display::count(p.leads),
            quotations: display::count(p.quotations),
            orders: display::count(p.orders),
            lead_to_quote: display::percent(p.conversion_rates.lead_to_quotation),
            quote_to_order: display::percent(p.conversion_rates.quotation_to_order),
        }
    }
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    label: String,
    #[tabled(rename = "Licenses")]
    count: usize,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "By Type")]
    by_type: String,
}

fn month_row(m: &MonthlyExpiry, currency: &str) -> MonthRow {
    let value: f64 = m.by_type.values().map(|t| t.value).sum();
    let by_type = m
        .by_type
        .iter()
        .map(|(kind, t)| format!("{kind}: {}", t.count))
        .collect::<Vec<_>>()
        .join(", ");
    MonthRow {
        label: m.label.clone(),
        count: m.licenses.len(),
        value: display::money(value, currency),
        by_type,
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn dashboard_detail(d: &DashboardSummary, color: bool) -> String {
    let p = &d.current_period;
    let rows = [
        ("Leads", p.leads, d.totals.leads),
        ("Quotations", p.quotations, d.totals.quotations),
        ("Orders", p.orders, d.totals.orders),
    ]
    .into_iter()
    .map(|(metric, current, total)| MetricRow {
        metric,
        current: display::count(current.count),
        growth: output::growth(current.growth, color),
        total: display::count(total),
    })
    .collect::<Vec<_>>();

    let mut out = output::render_table(&rows);
    let r = &d.conversion_rates;
    let _ = write!(
        out,
        "\n\nExpiring licenses: {}\nConversion: lead→quote {}  quote→order {}  overall {}",
        display::count(p.expiring_licenses),
        display::percent(r.lead_to_quotation),
        display::percent(r.quotation_to_order),
        display::percent(r.overall),
    );
    out
}

fn funnel_detail(f: &SalesFunnelSummary) -> String {
    let rows: Vec<FunnelRow> = f.breakdown.iter().map(FunnelRow::from).collect();
    let mut out = output::render_table(&rows);
    let _ = write!(
        out,
        "\n\nTotals ({}): {} leads, {} quotations, {} orders -- overall conversion {}",
        f.group_by,
        display::count(f.totals.leads),
        display::count(f.totals.quotations),
        display::count(f.totals.orders),
        display::percent(f.conversion_rates.overall),
    );
    out
}

fn expiry_detail(e: &LicenseExpirySummary, currency: &str) -> String {
    let rows: Vec<MonthRow> = e.monthly.iter().map(|m| month_row(m, currency)).collect();
    let mut out = output::render_table(&rows);
    let _ = write!(
        out,
        "\n\n{}: {} licenses worth {} across {} months",
        e.year,
        display::count(e.totals.count),
        display::money(e.totals.value, currency),
        e.totals.months,
    );
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    snapshot: &ReportSnapshot,
    args: ReportsArgs,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let currency = defaults.currency.as_str();
    let empty = || CliError::RefreshFailed {
        message: "the backend returned no report data".into(),
    };

    let out = match args.command {
        ReportsCommand::Dashboard => {
            let d = snapshot.dashboard.as_ref().ok_or_else(empty)?;
            output::render_single(&global.output, d, |d| dashboard_detail(d, color), |d| {
                d.current_period.expiring_licenses.to_string()
            })?
        }
        ReportsCommand::Funnel => {
            let f = snapshot.sales_funnel.as_ref().ok_or_else(empty)?;
            match global.output {
                OutputFormat::Plain => f
                    .breakdown
                    .iter()
                    .map(|p| p.label.clone())
                    .collect::<Vec<_>>()
                    .join("\n"),
                _ => output::render_single(&global.output, f, funnel_detail, |f| f.group_by.clone())?,
            }
        }
        ReportsCommand::Licenses => {
            let e = snapshot.license_expiry.as_ref().ok_or_else(empty)?;
            output::render_single(&global.output, e, |e| expiry_detail(e, currency), |e| {
                e.totals.count.to_string()
            })?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crmdesk_core::{EntityTotals, PeriodMetric, TypeBreakdown};

    use super::*;

    #[test]
    fn dashboard_detail_lists_metrics() {
        let mut d = DashboardSummary {
            totals: EntityTotals {
                leads: 1200,
                quotations: 40,
                orders: 9,
            },
            ..DashboardSummary::default()
        };
        d.current_period.leads = PeriodMetric {
            count: 15,
            growth: 25.0,
        };
        let text = dashboard_detail(&d, false);
        assert!(text.contains("Leads"));
        assert!(text.contains("1,200"));
        assert!(text.contains("+25.0%"));
    }

    #[test]
    fn month_row_sums_type_values() {
        let mut m = MonthlyExpiry {
            label: "March".into(),
            ..MonthlyExpiry::default()
        };
        m.by_type.insert("AMC".into(), TypeBreakdown { count: 2, value: 1000.0 });
        m.by_type.insert("ATS".into(), TypeBreakdown { count: 1, value: 250.5 });
        let row = month_row(&m, "$");
        assert_eq!(row.value, "$1,250.50");
        assert_eq!(row.by_type, "AMC: 2, ATS: 1");
    }
}
