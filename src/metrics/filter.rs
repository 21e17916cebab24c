//! Branch discovery and filtering.

use crate::domain::{BranchSelection, DerivedRecord};

/// Distinct branch values, sorted ascending (case-sensitive).
pub fn distinct_branches(records: &[DerivedRecord]) -> Vec<String> {
    let mut branches: Vec<String> = records.iter().map(|r| r.branch().to_string()).collect();
    branches.sort();
    branches.dedup();
    branches
}

/// Rows matching the selection; `All` keeps every row.
pub fn filter_by_branch<'a>(records: &'a [DerivedRecord], selection: &BranchSelection) -> Vec<&'a DerivedRecord> {
    records.iter().filter(|r| selection.matches(r.branch())).collect()
}
