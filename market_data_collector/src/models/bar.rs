//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! Every value cell is optional: a terminal export may leave cells blank, and
//! the quality checks need to see those gaps rather than have them papered
//! over with defaults. Besides OHLCV a terminal rate row carries `spread` and
//! `real_volume`; both are kept so saved files and row comparisons see every
//! field the terminal produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single time-series bar for a given timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: Option<f64>,

    /// Highest price during the bar interval.
    pub high: Option<f64>,

    /// Lowest price during the bar interval.
    pub low: Option<f64>,

    /// Closing price.
    pub close: Option<f64>,

    /// Volume traded during the bar interval (tick volume for terminals).
    /// Not all sources supply this.
    pub volume: Option<u64>,

    /// Spread in points.
    pub spread: Option<i64>,

    /// Exchange volume, zero for most OTC instruments.
    pub real_volume: Option<u64>,
}

impl Bar {
    /// A fully populated bar.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
            spread: None,
            real_volume: None,
        }
    }

    /// Attach the terminal-only fields.
    pub fn with_terminal_fields(mut self, spread: i64, real_volume: u64) -> Self {
        self.spread = Some(spread);
        self.real_volume = Some(real_volume);
        self
    }

    pub fn price(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }

    pub fn price_mut(&mut self, field: PriceField) -> &mut Option<f64> {
        match field {
            PriceField::Open => &mut self.open,
            PriceField::High => &mut self.high,
            PriceField::Low => &mut self.low,
            PriceField::Close => &mut self.close,
        }
    }
}

/// One of the four price columns of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl PriceField {
    pub const ALL: [PriceField; 4] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
    ];

    /// Column name as used in CSV headers and reports.
    pub const fn name(self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        }
    }
}

/// Header the volume column was read from. Written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeHeader {
    #[default]
    Volume,
    TickVolume,
}

impl VolumeHeader {
    pub const fn name(self) -> &'static str {
        match self {
            VolumeHeader::Volume => "volume",
            VolumeHeader::TickVolume => "tick_volume",
        }
    }
}

/// Which value columns a series carries. The timestamp is always present.
///
/// A column that is absent is not the same as a column full of blanks: absent
/// columns contribute nothing to missing-value counts, duplicate comparison
/// or outlier checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    pub open: bool,
    pub high: bool,
    pub low: bool,
    pub close: bool,
    pub volume: bool,
    pub volume_header: VolumeHeader,
    pub spread: bool,
    pub real_volume: bool,
}

impl Columns {
    /// Open, high, low, close and volume.
    pub const OHLCV: Columns = Columns {
        open: true,
        high: true,
        low: true,
        close: true,
        volume: true,
        volume_header: VolumeHeader::Volume,
        spread: false,
        real_volume: false,
    };

    /// Every field of a terminal rate row, as the terminal names them.
    pub const TERMINAL: Columns = Columns {
        volume_header: VolumeHeader::TickVolume,
        spread: true,
        real_volume: true,
        ..Columns::OHLCV
    };

    pub const NONE: Columns = Columns {
        open: false,
        high: false,
        low: false,
        close: false,
        volume: false,
        volume_header: VolumeHeader::Volume,
        spread: false,
        real_volume: false,
    };

    pub fn has_price(&self, field: PriceField) -> bool {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }

    pub fn set_price(&mut self, field: PriceField, present: bool) {
        match field {
            PriceField::Open => self.open = present,
            PriceField::High => self.high = present,
            PriceField::Low => self.low = present,
            PriceField::Close => self.close = present,
        }
    }

    /// Present price columns in open, high, low, close order.
    pub fn prices(&self) -> impl Iterator<Item = PriceField> + '_ {
        PriceField::ALL
            .into_iter()
            .filter(move |field| self.has_price(*field))
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self::OHLCV
    }
}
