use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::bar::{Columns, PriceField};

/// Result of a quality check over one bar series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Number of bars in the series.
    pub total_count: usize,
    /// Blank cells across every present column.
    pub missing_values: usize,
    /// Rows identical to an earlier row; the first occurrence is not counted.
    pub duplicates: usize,
    /// Outlier count per present price column, in open/high/low/close order.
    pub outliers: IndexMap<PriceField, usize>,
    /// Consecutive-bar gaps that differ from the expected interval.
    pub irregular_intervals: usize,
}

impl QualityReport {
    /// All-zero report with an entry for each present price column.
    pub fn empty(columns: &Columns) -> Self {
        Self {
            total_count: 0,
            missing_values: 0,
            duplicates: 0,
            outliers: columns.prices().map(|field| (field, 0)).collect(),
            irregular_intervals: 0,
        }
    }

    pub fn outliers_for(&self, field: PriceField) -> Option<usize> {
        self.outliers.get(&field).copied()
    }

    pub fn total_outliers(&self) -> usize {
        self.outliers.values().sum()
    }

    /// True when no check flagged anything.
    pub fn is_clean(&self) -> bool {
        self.missing_values == 0
            && self.duplicates == 0
            && self.irregular_intervals == 0
            && self.total_outliers() == 0
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data quality check:")?;
        writeln!(f, "  rows: {}", self.total_count)?;
        writeln!(f, "  missing values: {}", self.missing_values)?;
        writeln!(f, "  duplicate rows: {}", self.duplicates)?;
        for (field, count) in &self.outliers {
            writeln!(f, "  {} outliers: {count}", field.name())?;
        }
        write!(f, "  irregular intervals: {}", self.irregular_intervals)
    }
}
