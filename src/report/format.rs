//! Text formatting for metrics and the `sales report` output.

use crate::app::pipeline::Dashboard;
use crate::domain::ProductReport;
use crate::plot::render_ascii_chart;

/// Labels shared by the text report and the TUI metric cards.
pub const PRICE_LABEL: &str = "Average price";
pub const MARGIN_LABEL: &str = "Average margin";
pub const UNITS_LABEL: &str = "Units sold";

/// `$12.34`, `-$12.34`, or `n/a` for a non-finite mean.
pub fn fmt_price(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    if v < 0.0 {
        format!("-${:.2}", v.abs())
    } else {
        format!("${v:.2}")
    }
}

/// Whole-number percentage: `0.256 -> 26%`.
pub fn fmt_margin(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    format!("{:.0}%", v * 100.0)
}

/// Rounded to a whole number with thousands separators: `12345.4 -> 12,345`.
pub fn fmt_units(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let rounded = format!("{:.0}", v.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if v < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

/// Title of the per-product chart.
pub fn chart_title(product: &str) -> String {
    format!("Monthly sales - {product}")
}

/// The three metric lines of one product.
pub fn format_metrics(report: &ProductReport) -> String {
    let s = &report.summary;
    let mut out = String::new();
    out.push_str(&format!("{PRICE_LABEL:<16}{}\n", fmt_price(s.mean_unit_price)));
    out.push_str(&format!("{MARGIN_LABEL:<16}{}\n", fmt_margin(s.mean_margin_ratio)));
    out.push_str(&format!("{UNITS_LABEL:<16}{}\n", fmt_units(s.total_units)));
    out
}

/// Format a full run: heading, then metrics (+ optional chart) per product.
pub fn format_dashboard(dashboard: &Dashboard, plot: Option<(usize, usize)>) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Sales analysis: {} ===\n", dashboard.upload_name));
    out.push_str(&format!("Data for: {}\n", dashboard.selection));
    out.push_str(&format!(
        "Rows: {} used of {} read ({} skipped) | {} selected\n",
        dashboard.stats.rows_used,
        dashboard.stats.rows_read,
        dashboard.stats.rows_skipped(),
        dashboard.rows_selected,
    ));
    for err in &dashboard.row_errors {
        out.push_str(&format!("  (skipped line {}) {}\n", err.line, err.message));
    }

    if dashboard.reports.is_empty() {
        out.push_str("\nNo products to show.\n");
        return out;
    }

    for report in &dashboard.reports {
        out.push('\n');
        out.push_str(&format!("## {}\n", report.summary.product));
        out.push_str(&format_metrics(report));

        if let Some((width, height)) = plot {
            out.push('\n');
            out.push_str(&format!("{}\n", chart_title(&report.summary.product)));
            out.push_str(&render_ascii_chart(&report.series, &report.trend, width, height));
        }
    }

    out
}
