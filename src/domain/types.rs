//! Shared domain types.
//!
//! Every stage of the pipeline produces a new value from these types; nothing
//! is mutated after it has been derived.

use std::fmt;
use std::sync::Arc;

/// Sentinel shown in selectors for "no branch filter".
pub const ALL_BRANCHES_LABEL: &str = "All";

/// One row of the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub branch: String,
    pub product: String,
    pub year: i32,
    /// Calendar month, 1–12.
    pub month: u32,
    pub units_sold: f64,
    pub revenue: f64,
    pub cost: f64,
}

/// A `SalesRecord` plus the three computed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub record: SalesRecord,
    /// `revenue / units_sold`; non-finite when no units were sold.
    pub unit_price: f64,
    /// `(revenue - cost) / revenue`; non-finite when revenue is zero.
    pub margin_ratio: f64,
    /// `YYYY-MM` with a zero-padded month, so string order is calendar order.
    pub year_month: String,
}

impl DerivedRecord {
    pub fn branch(&self) -> &str {
        &self.record.branch
    }

    pub fn product(&self) -> &str {
        &self.record.product
    }
}

/// Per-product scalar metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub product: String,
    /// Mean of the finite unit prices; `NaN` when none are finite.
    pub mean_unit_price: f64,
    /// Mean of the finite margin ratios; `NaN` when none are finite.
    pub mean_margin_ratio: f64,
    pub total_units: f64,
}

/// All rows of one product that share a year-month label, summed.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    pub year_month: String,
    pub units_sold: f64,
    pub revenue: f64,
    pub cost: f64,
}

/// Monthly points ordered by year-month label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    pub points: Vec<MonthlyPoint>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.year_month.as_str())
    }

    pub fn units(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.units_sold).collect()
    }
}

/// Degree-1 least-squares fit over the series position index `x = 0..n-1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn flat(level: f64) -> Self {
        Self {
            slope: 0.0,
            intercept: level,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Fitted values at `x = 0, 1, ..., n-1`.
    pub fn predictions(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.predict(i as f64)).collect()
    }
}

/// Everything the presenter needs for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductReport {
    pub summary: ProductSummary,
    pub series: MonthlySeries,
    pub trend: TrendLine,
}

/// Which rows feed the per-product sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BranchSelection {
    #[default]
    All,
    Branch(String),
}

impl BranchSelection {
    /// Resolve a user-supplied branch name against the branches present in the data.
    ///
    /// Branch names match exactly and win over the sentinel, so a branch
    /// called `all` stays selectable. Otherwise `All` matches case-insensitively.
    pub fn resolve(input: &str, branches: &[String]) -> Option<Self> {
        let input = input.trim();
        if let Some(b) = branches.iter().find(|b| b.as_str() == input) {
            return Some(Self::Branch(b.clone()));
        }
        input.eq_ignore_ascii_case(ALL_BRANCHES_LABEL).then_some(Self::All)
    }

    /// `All` followed by the branches, in selector order.
    pub fn options(branches: &[String]) -> Vec<Self> {
        std::iter::once(Self::All)
            .chain(branches.iter().cloned().map(Self::Branch))
            .collect()
    }

    pub fn matches(&self, branch: &str) -> bool {
        match self {
            Self::All => true,
            Self::Branch(b) => b == branch,
        }
    }
}

impl fmt::Display for BranchSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_BRANCHES_LABEL),
            Self::Branch(b) => f.write_str(b),
        }
    }
}

/// A CSV file held in memory for the current session.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// One interaction's worth of input: the uploaded file plus the branch choice.
///
/// Rebuilt on every interaction and passed to the pipeline by value.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub upload: Upload,
    pub selection: BranchSelection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_predictions_follow_the_line() {
        let line = TrendLine {
            slope: 2.0,
            intercept: 1.0,
        };
        assert_eq!(line.predictions(3), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn resolve_branch_selection() {
        let branches = vec!["Centro".to_string(), "Norte".to_string()];
        assert_eq!(BranchSelection::resolve("all", &branches), Some(BranchSelection::All));
        assert_eq!(
            BranchSelection::resolve("Norte", &branches),
            Some(BranchSelection::Branch("Norte".to_string()))
        );
        assert_eq!(BranchSelection::resolve("norte", &branches), None);
        assert_eq!(BranchSelection::resolve("Sur", &branches), None);
    }

    #[test]
    fn branch_named_like_the_sentinel_is_selectable() {
        let branches = vec!["all".to_string(), "Norte".to_string()];
        assert_eq!(
            BranchSelection::resolve("all", &branches),
            Some(BranchSelection::Branch("all".to_string()))
        );
        assert_eq!(BranchSelection::resolve("All", &branches), Some(BranchSelection::All));
    }

    #[test]
    fn options_start_with_all() {
        let branches = vec!["A".to_string(), "B".to_string()];
        let opts = BranchSelection::options(&branches);
        assert_eq!(opts.len(), 3);
        assert_eq!(opts[0], BranchSelection::All);
        assert_eq!(opts[2].to_string(), "B");
    }
}
