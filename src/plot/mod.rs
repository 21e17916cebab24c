//! Chart helpers shared by the text report and the TUI.
//!
//! - x-axis tick selection for monthly series
//! - ASCII bar + trend rendering (`ascii`)

pub mod ascii;

pub use ascii::*;

/// Target number of x-axis labels for a monthly chart.
pub const MAX_X_TICKS: usize = 12;

/// Step between labelled bars: `max(1, n / 12)`.
///
/// Every bar is still drawn; only the labels are decimated.
pub fn tick_stride(n: usize) -> usize {
    (n / MAX_X_TICKS).max(1)
}

/// Series positions that carry an x-axis label.
pub fn tick_indices(n: usize) -> Vec<usize> {
    (0..n).step_by(tick_stride(n)).collect()
}
