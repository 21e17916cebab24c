//! Linear trend over a monthly series.
//!
//! Fits `y = slope * x + intercept` by ordinary least squares where `x` is the
//! position in the series (`0..n-1`), not calendar time. Gaps between months
//! are therefore not stretched on the x axis.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::TrendLine;
use crate::math::solve_least_squares;

/// Fit a degree-1 trend to `values` indexed by position.
///
/// Degenerate inputs never fail:
/// - one point gives a flat line through it
/// - no points gives a flat line at zero
/// - an unsolvable system falls back to a flat line at the mean
pub fn fit_trend(values: &[f64]) -> TrendLine {
    match values {
        [] => TrendLine::flat(0.0),
        [only] => TrendLine::flat(*only),
        _ => fit_ols(values).unwrap_or_else(|| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            debug!(n = values.len(), "trend solve failed, using flat mean");
            TrendLine::flat(mean)
        }),
    }
}

fn fit_ols(values: &[f64]) -> Option<TrendLine> {
    let n = values.len();

    // Design row: [1, x] so beta = [intercept, slope].
    let mut x = DMatrix::<f64>::zeros(n, 2);
    for i in 0..n {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = i as f64;
    }
    let y = DVector::from_column_slice(values);

    let beta = solve_least_squares(&x, &y)?;
    Some(TrendLine {
        intercept: beta[0],
        slope: beta[1],
    })
}
