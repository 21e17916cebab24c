//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline and presentation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales analysis dashboard for point-of-sale CSV exports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(TuiArgs),
    /// Print per-product metrics and ASCII charts to stdout.
    Report(ReportArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    /// Sales CSV to open. Without it the dashboard starts in the file picker.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Initial branch selection ("All" or a branch present in the file).
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// Write logs to this file (the dashboard owns the terminal, so logs are
    /// off unless a file is given here or in `SALES_DASH_LOG`).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Sales CSV to analyze. Without it a file is picked interactively.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Branch to report on ("All" or a branch present in the file).
    #[arg(short = 'b', long, default_value = "All")]
    pub branch: String,

    /// Skip the per-product charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 10)]
    pub height: usize,
}
