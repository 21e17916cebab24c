//! Summary statistics over derived columns.
//!
//! Derived columns may hold non-finite values (a row with zero units has no
//! unit price). Means skip those values instead of letting one of them turn
//! the whole average into `inf`/`NaN`.

/// Arithmetic mean of the finite values in `values`.
///
/// Returns `NaN` when no finite value is present.
pub fn finite_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Sum of the finite values in `values`; `0.0` when there are none.
///
/// Blank cells arrive as `NaN` and must not wipe out a whole total.
pub fn finite_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().filter(|v| v.is_finite()).sum()
}
