//! `sales-dash` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - the metrics pipeline is testable without a terminal
//! - the text report and the interactive dashboard share one pipeline

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod tui;
