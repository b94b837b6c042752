use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use snafu::{OptionExt, ensure};

use crate::models::{
    bar::{Bar, Columns, PriceField},
    bar_series::BarSeries,
};
use crate::validation::{
    InvalidQuantilesSnafu, NoPriceColumnsSnafu, NonPositiveIntervalSnafu, QualityReport,
    UndefinedIntervalSnafu, UnorderableValueSnafu, ValidationError, percentile,
};

const DEFAULT_LOWER_QUANTILE: f64 = 0.01;
const DEFAULT_UPPER_QUANTILE: f64 = 0.99;

/// Stateless quality checker for bar series.
///
/// The only configuration is the pair of quantiles that bound the "normal"
/// range of each price column; values strictly outside `[lower, upper]` are
/// outliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetValidator {
    lower_quantile: f64,
    upper_quantile: f64,
}

impl Default for DatasetValidator {
    fn default() -> Self {
        Self {
            lower_quantile: DEFAULT_LOWER_QUANTILE,
            upper_quantile: DEFAULT_UPPER_QUANTILE,
        }
    }
}

impl DatasetValidator {
    pub fn with_quantiles(lower: f64, upper: f64) -> Result<Self, ValidationError> {
        ensure!(
            (0.0..=1.0).contains(&lower) && (0.0..=1.0).contains(&upper) && lower < upper,
            InvalidQuantilesSnafu { lower, upper }
        );
        Ok(Self {
            lower_quantile: lower,
            upper_quantile: upper,
        })
    }

    pub fn quantiles(&self) -> (f64, f64) {
        (self.lower_quantile, self.upper_quantile)
    }

    /// Check `series` against its own timeframe's bar spacing.
    pub fn validate_timeframe(&self, series: &BarSeries) -> Result<QualityReport, ValidationError> {
        let interval = series
            .timeframe
            .duration()
            .context(UndefinedIntervalSnafu {
                timeframe: series.timeframe.label(),
            })?;
        self.validate(series, interval)
    }

    /// Compute the quality report for `series`.
    ///
    /// An empty series yields an all-zero report. Fails when
    /// `expected_interval` is not positive, when a non-empty series has no
    /// price columns, or when a price cell is NaN.
    pub fn validate(
        &self,
        series: &BarSeries,
        expected_interval: TimeDelta,
    ) -> Result<QualityReport, ValidationError> {
        ensure!(
            expected_interval > TimeDelta::zero(),
            NonPositiveIntervalSnafu {
                interval: expected_interval
            }
        );

        let columns = &series.columns;
        if series.is_empty() {
            return Ok(QualityReport::empty(columns));
        }
        ensure!(
            columns.prices().next().is_some(),
            NoPriceColumnsSnafu {
                symbol: series.symbol.clone()
            }
        );
        check_orderable(&series.bars, columns)?;

        let outliers = columns
            .prices()
            .map(|field| (field, self.count_outliers(&series.bars, field)))
            .collect();

        Ok(QualityReport {
            total_count: series.len(),
            missing_values: count_missing(&series.bars, columns),
            duplicates: count_duplicates(&series.bars, columns),
            outliers,
            irregular_intervals: count_irregular_intervals(&series.bars, expected_interval),
        })
    }

    fn count_outliers(&self, bars: &[Bar], field: PriceField) -> usize {
        let mut values: Vec<f64> = bars.iter().filter_map(|b| b.price(field)).collect();
        values.sort_by(f64::total_cmp);

        let (Some(low), Some(high)) = (
            percentile(&values, self.lower_quantile),
            percentile(&values, self.upper_quantile),
        ) else {
            return 0;
        };
        values.iter().filter(|&&v| v < low || v > high).count()
    }
}

fn check_orderable(bars: &[Bar], columns: &Columns) -> Result<(), ValidationError> {
    for field in columns.prices() {
        if let Some(row) = bars
            .iter()
            .position(|b| b.price(field).is_some_and(f64::is_nan))
        {
            return UnorderableValueSnafu { column: field, row }.fail();
        }
    }
    Ok(())
}

fn count_missing(bars: &[Bar], columns: &Columns) -> usize {
    bars.iter()
        .map(|bar| {
            let prices = columns
                .prices()
                .filter(|field| bar.price(*field).is_none())
                .count();
            let extras = [
                columns.volume && bar.volume.is_none(),
                columns.spread && bar.spread.is_none(),
                columns.real_volume && bar.real_volume.is_none(),
            ];
            prices + extras.into_iter().filter(|blank| *blank).count()
        })
        .sum()
}

/// Full-row identity over the present columns. Prices compare by bit
/// pattern, with `-0.0` folded into `0.0`.
#[derive(PartialEq, Eq, Hash)]
struct RowKey {
    timestamp: DateTime<Utc>,
    prices: [Option<u64>; 4],
    volume: Option<u64>,
    spread: Option<i64>,
    real_volume: Option<u64>,
}

impl RowKey {
    fn new(bar: &Bar, columns: &Columns) -> Self {
        let prices = PriceField::ALL.map(|field| {
            if !columns.has_price(field) {
                return None;
            }
            bar.price(field)
                .map(|v| if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() })
        });
        Self {
            timestamp: bar.timestamp,
            prices,
            volume: bar.volume.filter(|_| columns.volume),
            spread: bar.spread.filter(|_| columns.spread),
            real_volume: bar.real_volume.filter(|_| columns.real_volume),
        }
    }
}

fn count_duplicates(bars: &[Bar], columns: &Columns) -> usize {
    let mut seen = HashSet::with_capacity(bars.len());
    bars.iter()
        .filter(|bar| !seen.insert(RowKey::new(bar, columns)))
        .count()
}

fn count_irregular_intervals(bars: &[Bar], expected: TimeDelta) -> usize {
    bars.windows(2)
        .filter(|pair| pair[1].timestamp - pair[0].timestamp != expected)
        .count()
}
