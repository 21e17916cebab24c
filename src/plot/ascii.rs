//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - monthly units: `#` bars, one slot per month
//! - fitted trend: `*`, one mark per month
//! - x-axis labels at the tick stride, skipped when they would overlap

use crate::domain::{MonthlySeries, TrendLine};
use crate::plot::tick_indices;

/// Render the monthly bars with the trend overlay.
pub fn render_ascii_chart(series: &MonthlySeries, trend: &TrendLine, width: usize, height: usize) -> String {
    let n = series.len();
    if n == 0 {
        return "(no data)\n".to_string();
    }

    let height = height.max(3);
    // Bars are never dropped: a long series widens the chart instead.
    let slot = (width / n).max(1);
    let bar_w = if slot >= 2 { slot - 1 } else { 1 };
    let grid_w = n * slot;

    let values = series.units();
    let fitted = trend.predictions(n);

    let (y_lo, y_hi) = y_range(&values, &fitted);

    let mut grid = vec![vec![' '; grid_w]; height];
    let base = map_y(0.0_f64.clamp(y_lo, y_hi), y_lo, y_hi, height);

    for (i, &v) in values.iter().enumerate() {
        let top = map_y(v, y_lo, y_hi, height);
        let (r0, r1) = if top <= base { (top, base) } else { (base, top) };
        let start = i * slot;
        for row in grid.iter_mut().take(r1 + 1).skip(r0) {
            for cell in row.iter_mut().skip(start).take(bar_w) {
                *cell = '#';
            }
        }
    }

    // Trend marks go on top of the bars.
    for (i, &y) in fitted.iter().enumerate() {
        if !y.is_finite() {
            continue;
        }
        let row = map_y(y, y_lo, y_hi, height);
        grid[row][i * slot + bar_w / 2] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!("units=[{y_lo:.2}, {y_hi:.2}] | # sales  * trend\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out.push_str(&label_line(series, slot));
    out.push('\n');
    out
}

fn label_line(series: &MonthlySeries, slot: usize) -> String {
    let mut line = String::new();
    for i in tick_indices(series.len()) {
        let col = i * slot;
        // Keep one blank column between neighbouring labels.
        let used = line.chars().count();
        if used > 0 && col < used + 1 {
            continue;
        }
        line.push_str(&" ".repeat(col - used));
        line.push_str(&series.points[i].year_month);
    }
    line
}

fn y_range(values: &[f64], fitted: &[f64]) -> (f64, f64) {
    let mut lo = 0.0_f64;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().chain(fitted).filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !hi.is_finite() || hi <= lo {
        hi = lo + 1.0;
    }
    (lo, hi)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthlyPoint;
    use crate::fit::fit_trend;

    fn series(values: &[f64]) -> MonthlySeries {
        MonthlySeries {
            points: values
                .iter()
                .enumerate()
                .map(|(i, &v)| MonthlyPoint {
                    year_month: format!("2024-{:02}", i + 1),
                    units_sold: v,
                    revenue: 0.0,
                    cost: 0.0,
                })
                .collect(),
        }
    }

    #[test]
    fn chart_golden_snapshot_small() {
        let s = series(&[10.0, 20.0, 30.0]);
        let trend = fit_trend(&s.units());
        let txt = render_ascii_chart(&s, &trend, 24, 4);
        let expected = concat!(
            "units=[0.00, 30.00] | # sales  * trend\n",
            "                ###*###\n",
            "        ###*### #######\n",
            "###*### ####### #######\n",
            "####### ####### #######\n",
            "2024-01 2024-02 2024-03\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn long_series_keeps_every_bar() {
        let values: Vec<f64> = (0..30).map(|i| i as f64 + 1.0).collect();
        let s = series(&values);
        let txt = render_ascii_chart(&s, &fit_trend(&values), 10, 5);
        let bottom = txt.lines().nth(5).unwrap();
        assert_eq!(bottom.len(), 30);
        assert!(bottom.chars().all(|c| c == '#' || c == '*'));
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let txt = render_ascii_chart(&MonthlySeries::default(), &TrendLine::flat(0.0), 20, 5);
        assert_eq!(txt, "(no data)\n");
    }
}
