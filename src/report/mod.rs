//! Reporting utilities: metric formatting and the plain-text dashboard.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays free of presentation concerns
//! - the text report and the TUI show identical numbers

pub mod format;

pub use format::*;
