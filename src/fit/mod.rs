//! Trend fitting for monthly series.

pub mod trend;

pub use trend::*;
