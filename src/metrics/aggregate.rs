//! Per-product aggregation.
//!
//! For each product present in the (filtered) rows we produce:
//! - scalar metrics (`ProductSummary`)
//! - the monthly units series, one point per year-month label (`MonthlySeries`)
//! - the linear trend over that series (`TrendLine`)

use std::collections::{BTreeMap, HashSet};

use crate::domain::{DerivedRecord, MonthlyPoint, MonthlySeries, ProductReport, ProductSummary};
use crate::fit::fit_trend;
use crate::math::{finite_mean, finite_sum};

/// Distinct products, in order of first appearance.
pub fn products(rows: &[&DerivedRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|r| r.product())
        .filter(|p| seen.insert(*p))
        .map(str::to_string)
        .collect()
}

/// Mean price, mean margin and total units over one product's rows.
pub fn summarize(product: &str, rows: &[&DerivedRecord]) -> ProductSummary {
    ProductSummary {
        product: product.to_string(),
        mean_unit_price: finite_mean(rows.iter().map(|r| r.unit_price)),
        mean_margin_ratio: finite_mean(rows.iter().map(|r| r.margin_ratio)),
        total_units: finite_sum(rows.iter().map(|r| r.record.units_sold)),
    }
}

/// Sum the numeric columns of all rows sharing a year-month label.
///
/// Points come out in calendar order; blank (`NaN`) cells add nothing.
pub fn monthly_series(rows: &[&DerivedRecord]) -> MonthlySeries {
    let mut by_month: BTreeMap<(i32, u32), MonthlyPoint> = BTreeMap::new();

    for r in rows {
        let point = by_month
            .entry((r.record.year, r.record.month))
            .or_insert_with(|| MonthlyPoint {
                year_month: r.year_month.clone(),
                units_sold: 0.0,
                revenue: 0.0,
                cost: 0.0,
            });
        add_finite(&mut point.units_sold, r.record.units_sold);
        add_finite(&mut point.revenue, r.record.revenue);
        add_finite(&mut point.cost, r.record.cost);
    }

    MonthlySeries {
        points: by_month.into_values().collect(),
    }
}

fn add_finite(total: &mut f64, v: f64) {
    if v.is_finite() {
        *total += v;
    }
}

/// Lazily build one report per product.
///
/// The sequence is finite and single-pass; callers re-run the pipeline to get
/// a fresh one.
pub fn product_reports<'a>(rows: &'a [&'a DerivedRecord]) -> impl Iterator<Item = ProductReport> + 'a {
    products(rows).into_iter().map(move |product| {
        let group: Vec<&DerivedRecord> = rows.iter().copied().filter(|r| r.product() == product).collect();
        build_report(&product, &group)
    })
}

fn build_report(product: &str, group: &[&DerivedRecord]) -> ProductReport {
    let summary = summarize(product, group);
    let series = monthly_series(group);
    let trend = fit_trend(&series.units());
    ProductReport {
        summary,
        series,
        trend,
    }
}
