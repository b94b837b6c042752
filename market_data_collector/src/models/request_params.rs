use serde::{Deserialize, Serialize};

use crate::models::timeframe::TimeFrame;

/// Parameters for requesting recent bar data from a terminal.
///
/// Terminals hand out history by position rather than by date range: the
/// request asks for the `count` most recent bars of each symbol, which is the
/// same as copying rates starting from position 0.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// List of symbols to request (e.g., `["GOLD", "USDJPY"]`).
    pub symbols: Vec<String>,

    /// The time interval for each bar.
    pub timeframe: TimeFrame,

    /// Number of most recent bars to return per symbol.
    pub count: usize,
}

impl BarsRequestParams {
    pub fn single(symbol: impl Into<String>, timeframe: TimeFrame, count: usize) -> Self {
        Self {
            symbols: vec![symbol.into()],
            timeframe,
            count,
        }
    }
}
