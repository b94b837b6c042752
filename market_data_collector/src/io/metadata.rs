//! JSON sidecar describing a saved bar series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::bar_series::BarSeries;
use crate::tz;
use crate::validation::QualityReport;

/// Compact stamp used in file names and `created_at`.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub symbol: String,
    /// Terminal label of the timeframe, e.g. `M15`.
    pub timeframe: String,
    pub count: usize,
    /// First bar, `YYYY-mm-dd HH:MM:SS` UTC; `None` for an empty series.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub created_at: String,
    pub quality: QualityReport,
}

impl SeriesMetadata {
    pub fn new(series: &BarSeries, quality: &QualityReport, created_at: DateTime<Utc>) -> Self {
        Self {
            symbol: series.symbol.clone(),
            timeframe: series.timeframe.label(),
            count: series.len(),
            start_time: series.first_timestamp().map(tz::format_naive),
            end_time: series.last_timestamp().map(tz::format_naive),
            created_at: created_at.format(STAMP_FORMAT).to_string(),
            quality: quality.clone(),
        }
    }
}
