//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging for the chosen front-end
//! - dispatches to the text report or the interactive dashboard

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, ReportArgs, TuiArgs};
use crate::domain::{BranchSelection, DashboardRequest, Upload};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `sales` and `sales -f ventas.csv` behave like `sales tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();

    let path = match &args.file {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };
    let upload = crate::io::read_upload(&path)?;
    let selection = resolve_selection(&upload, &args.branch)?;
    info!(file = %upload.name, %selection, "running report");

    let dashboard = pipeline::run_dashboard(&DashboardRequest { upload, selection })?;
    let plot = (!args.no_plot).then_some((args.width, args.height));
    print!("{}", crate::report::format_dashboard(&dashboard, plot));
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let log_file = args
        .log_file
        .clone()
        .or_else(|| std::env::var_os(crate::logging::LOG_FILE_ENV).map(PathBuf::from));
    crate::logging::init_file(log_file.as_deref())?;

    let upload = match &args.file {
        Some(path) => Some(crate::io::read_upload(&crate::cli::picker::validate_csv_path(path)?)?),
        None => None,
    };
    let selection = match (&upload, &args.branch) {
        (Some(upload), Some(branch)) => resolve_selection(upload, branch)?,
        (None, Some(_)) => return Err(AppError::usage("`--branch` needs a file (`-f <file.csv>`).")),
        _ => BranchSelection::All,
    };

    crate::tui::run(upload, selection)
}

/// Turn a `--branch` argument into a selection drawn from the file's own branches.
pub fn resolve_selection(upload: &Upload, branch: &str) -> Result<BranchSelection, AppError> {
    let probe = pipeline::run_dashboard(&DashboardRequest {
        upload: upload.clone(),
        selection: BranchSelection::All,
    })?;

    BranchSelection::resolve(branch, &probe.branches).ok_or_else(|| {
        AppError::usage(format!(
            "Unknown branch '{branch}'. Available: All, {}",
            probe.branches.join(", ")
        ))
    })
}

/// Rewrite argv so `sales` defaults to `sales tui`.
///
/// Rules:
/// - `sales`                      -> `sales tui`
/// - `sales -f ventas.csv ...`    -> `sales tui -f ventas.csv ...`
/// - `sales --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_dashboard() {
        assert_eq!(rewrite_args(argv(&["sales"])), argv(&["sales", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_the_dashboard() {
        assert_eq!(
            rewrite_args(argv(&["sales", "-f", "v.csv"])),
            argv(&["sales", "tui", "-f", "v.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["sales", "report"])), argv(&["sales", "report"]));
        assert_eq!(rewrite_args(argv(&["sales", "--help"])), argv(&["sales", "--help"]));
    }

    #[test]
    fn resolve_selection_uses_branches_from_the_file() {
        let upload = Upload::new(
            "v.csv",
            b"Sucursal,Producto,A\xc3\xb1o,Mes,Unidades_vendidas,Ingreso_total,Costo_total\nNorte,P,2024,1,1,1,1\n".to_vec(),
        );
        assert_eq!(
            resolve_selection(&upload, "Norte").unwrap(),
            BranchSelection::Branch("Norte".to_string())
        );
        assert_eq!(resolve_selection(&upload, "ALL").unwrap(), BranchSelection::All);
        let err = resolve_selection(&upload, "Sur").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Available: All, Norte"));
    }
}
