//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input rows and their derived form (`SalesRecord`, `DerivedRecord`)
//! - aggregation outputs (`ProductSummary`, `MonthlySeries`, `TrendLine`)
//! - the per-interaction request (`DashboardRequest`, `BranchSelection`)

pub mod types;

pub use types::*;
