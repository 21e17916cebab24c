//! Shared dashboard pipeline used by both the text report and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest + validate -> derive -> branch filter -> aggregate + trend
//!
//! The front-ends can then focus on presentation (printing vs widgets). The
//! pipeline holds no state between calls; every interaction builds a new
//! `DashboardRequest` and runs it from the raw upload bytes.

use tracing::info;

use crate::domain::{BranchSelection, DashboardRequest, DerivedRecord, ProductReport};
use crate::error::AppError;
use crate::io::ingest::{load_sales_records, IngestStats, RowError};
use crate::metrics::{derive, distinct_branches, filter_by_branch, product_reports};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub upload_name: String,
    /// Branches present in the unfiltered data, sorted ascending.
    pub branches: Vec<String>,
    pub selection: BranchSelection,
    pub stats: IngestStats,
    pub row_errors: Vec<RowError>,
    /// Rows left after the branch filter.
    pub rows_selected: usize,
    /// One report per product, in order of first appearance.
    pub reports: Vec<ProductReport>,
}

/// Execute the full pipeline for one request.
///
/// The only error is a missing required column; it is raised before any
/// derived value is computed.
pub fn run_dashboard(request: &DashboardRequest) -> Result<Dashboard, AppError> {
    // 1) Validate the header row and parse rows.
    let ingest = load_sales_records(&request.upload.bytes)?;

    // 2) Derived columns.
    let derived = derive(&ingest.records);
    let branches = distinct_branches(&derived);

    // 3) Branch filter.
    let selected: Vec<&DerivedRecord> = filter_by_branch(&derived, &request.selection);

    // 4) + 5) Aggregate per product and fit trends.
    let reports: Vec<ProductReport> = product_reports(&selected).collect();

    info!(
        file = %request.upload.name,
        selection = %request.selection,
        rows = selected.len(),
        products = reports.len(),
        "dashboard run complete"
    );

    Ok(Dashboard {
        upload_name: request.upload.name.clone(),
        branches,
        selection: request.selection.clone(),
        stats: ingest.stats,
        row_errors: ingest.row_errors,
        rows_selected: selected.len(),
        reports,
    })
}
