//! Bar interval expressed as amount × unit.
//!
//! Terminals name these with short labels (`M15`, `H1`, `D1`, `W1`, `MN1`);
//! the same labels are used in exported and saved file names.

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeFrameError {
    #[error("Invalid amount {amount} for {unit:?}: {message}")]
    InvalidAmount {
        amount: u32,
        unit: TimeFrameUnit,
        message: &'static str,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrameUnit {
    /// Parse the short unit names accepted on the command line and in config:
    /// `m`/`min`/`minute`, `h`/`hr`/`hour`, `d`/`day`, `w`/`wk`/`week`, `mo`/`month`.
    pub fn parse(unit: &str) -> Result<Self, TimeFrameError> {
        match unit.trim().to_lowercase().as_str() {
            "m" | "min" | "minute" => Ok(Self::Minute),
            "h" | "hr" | "hour" => Ok(Self::Hour),
            "d" | "day" => Ok(Self::Day),
            "w" | "wk" | "week" => Ok(Self::Week),
            "mo" | "month" => Ok(Self::Month),
            _ => Err(TimeFrameError::InvalidInput {
                message: format!("Invalid timeframe unit: {unit}"),
            }),
        }
    }
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        Self::validate(amount, unit)?;
        Ok(Self { amount, unit })
    }

    pub fn minutes(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Minute)
    }

    pub fn hours(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Hour)
    }

    pub fn parse(amount: u32, unit: &str) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::parse(unit)?)
    }

    fn validate(amount: u32, unit: TimeFrameUnit) -> Result<(), TimeFrameError> {
        let message = match unit {
            TimeFrameUnit::Minute if !(1..=59).contains(&amount) => {
                "minute frames take amounts between 1 and 59"
            }
            TimeFrameUnit::Hour if !(1..=23).contains(&amount) => {
                "hour frames take amounts between 1 and 23"
            }
            TimeFrameUnit::Day | TimeFrameUnit::Week | TimeFrameUnit::Month if amount != 1 => {
                "day, week and month frames only take amount 1"
            }
            _ => return Ok(()),
        };
        Err(TimeFrameError::InvalidAmount {
            amount,
            unit,
            message,
        })
    }

    /// Nominal spacing between consecutive bars. `None` for months, whose
    /// length varies.
    pub fn duration(&self) -> Option<TimeDelta> {
        let amount = i64::from(self.amount);
        match self.unit {
            TimeFrameUnit::Minute => Some(TimeDelta::minutes(amount)),
            TimeFrameUnit::Hour => Some(TimeDelta::hours(amount)),
            TimeFrameUnit::Day => Some(TimeDelta::days(amount)),
            TimeFrameUnit::Week => Some(TimeDelta::weeks(amount)),
            TimeFrameUnit::Month => None,
        }
    }

    /// Terminal-style label, e.g. `M15` or `MN1`.
    pub fn label(&self) -> String {
        let prefix = match self.unit {
            TimeFrameUnit::Minute => "M",
            TimeFrameUnit::Hour => "H",
            TimeFrameUnit::Day => "D",
            TimeFrameUnit::Week => "W",
            TimeFrameUnit::Month => "MN",
        };
        format!("{prefix}{}", self.amount)
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
