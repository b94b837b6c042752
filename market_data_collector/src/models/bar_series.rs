//! A collection of time-series bars for a specific symbol and timeframe.

use chrono::{DateTime, Utc};

use crate::models::{
    bar::{Bar, Columns},
    timeframe::TimeFrame,
};

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol,
/// [`TimeFrame`] and the set of [`Columns`] the source supplied, making the
/// data set self-describing. Bars are expected in ascending timestamp order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "GOLD", "USDJPY").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// Value columns present in the source.
    pub columns: Columns,
    /// The collection of OHLCV bars.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// A series carrying open, high, low, close and volume.
    pub fn new(symbol: impl Into<String>, timeframe: TimeFrame, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            columns: Columns::OHLCV,
            bars,
        }
    }

    pub fn with_columns(mut self, columns: Columns) -> Self {
        self.columns = columns;
        self
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.timestamp)
    }

    /// Keep only the most recent `count` bars.
    pub fn keep_last(&mut self, count: usize) {
        let excess = self.bars.len().saturating_sub(count);
        self.bars.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn series(n: usize) -> BarSeries {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let bars = (0..n)
            .map(|i| {
                let ts = start + TimeDelta::minutes(15 * i as i64);
                Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 1)
            })
            .collect();
        BarSeries::new("GOLD", TimeFrame::minutes(15).unwrap(), bars)
    }

    #[test]
    fn keep_last_drops_oldest_bars() {
        let mut s = series(5);
        let fourth = s.bars[3].timestamp;
        s.keep_last(2);
        assert_eq!(s.len(), 2);
        assert_eq!(s.first_timestamp(), Some(fourth));
    }

    #[test]
    fn keep_last_larger_than_len_is_noop() {
        let mut s = series(3);
        s.keep_last(1000);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn empty_series_has_no_bounds() {
        let s = series(0);
        assert!(s.is_empty());
        assert!(s.first_timestamp().is_none());
        assert!(s.last_timestamp().is_none());
    }
}
