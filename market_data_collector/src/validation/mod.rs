//! Quality checks over bar series.
//!
//! [`DatasetValidator`] turns a [`BarSeries`](crate::models::bar_series::BarSeries)
//! into a [`QualityReport`]: blank cells, duplicated rows, per-column price
//! outliers and irregular spacing between consecutive bars. The computation is
//! pure; rendering the report is left to its `Display` impl.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use market_data_collector::models::{bar::Bar, bar_series::BarSeries, timeframe::TimeFrame};
//! use market_data_collector::validation::DatasetValidator;
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
//! let bars = (0..4)
//!     .map(|i| Bar::new(start + TimeDelta::minutes(15 * i), 10.0, 10.0, 10.0, 10.0, 1))
//!     .collect();
//! let series = BarSeries::new("GOLD", TimeFrame::minutes(15).unwrap(), bars);
//!
//! let report = DatasetValidator::default()
//!     .validate(&series, TimeDelta::minutes(15))
//!     .unwrap();
//! assert_eq!(report.total_count, 4);
//! assert!(report.is_clean());
//! ```

pub mod percentile;
pub mod report;
pub mod validator;

use chrono::TimeDelta;
use snafu::{Backtrace, Snafu};

use crate::models::bar::PriceField;

pub use percentile::percentile;
pub use report::QualityReport;
pub use validator::DatasetValidator;

/// Invalid input handed to the validator.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ValidationError {
    /// The expected bar spacing must be strictly positive.
    #[snafu(display("Expected interval must be positive, got {interval}"))]
    NonPositiveInterval {
        interval: TimeDelta,
        backtrace: Backtrace,
    },

    /// A non-empty series with none of open/high/low/close.
    #[snafu(display("Series {symbol} has no price columns to check"))]
    NoPriceColumns { symbol: String, backtrace: Backtrace },

    /// A price cell holds a value that cannot be ordered (NaN).
    #[snafu(display("Column {} holds an unorderable value at row {row}", column.name()))]
    UnorderableValue {
        column: PriceField,
        row: usize,
        backtrace: Backtrace,
    },

    /// The series timeframe has no fixed spacing to check against.
    #[snafu(display("Timeframe {timeframe} has no fixed bar interval"))]
    UndefinedInterval {
        timeframe: String,
        backtrace: Backtrace,
    },

    /// Outlier bounds must satisfy `0 <= lower < upper <= 1`.
    #[snafu(display("Invalid outlier quantiles: lower={lower}, upper={upper}"))]
    InvalidQuantiles {
        lower: f64,
        upper: f64,
        backtrace: Backtrace,
    },
}
