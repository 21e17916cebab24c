//! Per-row derived columns: unit price, margin ratio, year-month label.

use crate::domain::{DerivedRecord, SalesRecord};

/// Compute the derived columns for every record.
///
/// Division by zero is not an error here: IEEE arithmetic yields `inf`/`NaN`,
/// which the aggregation stage knows how to skip.
pub fn derive(records: &[SalesRecord]) -> Vec<DerivedRecord> {
    records.iter().map(derive_record).collect()
}

pub fn derive_record(record: &SalesRecord) -> DerivedRecord {
    DerivedRecord {
        unit_price: record.revenue / record.units_sold,
        margin_ratio: (record.revenue - record.cost) / record.revenue,
        year_month: year_month_label(record.year, record.month),
        record: record.clone(),
    }
}

/// `YYYY-MM`, month zero-padded to two digits.
pub fn year_month_label(year: i32, month: u32) -> String {
    format!("{year}-{month:02}")
}
