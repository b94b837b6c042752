//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the interface through which
//! bar series enter the crate, and [`Terminal`], a provider that is also a
//! connection which must be shut down. Terminal lifetimes are managed by
//! [`Session`](session::Session), which guarantees the shutdown happens on
//! every exit path.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_collector::models::{
//!     bar_series::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use market_data_collector::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<BarSeries>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod export_terminal;
pub mod session;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::io::bar_csv::ReadError;
use crate::models::{bar_series::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching time-series bar data from a market data source.
#[async_trait]
pub trait DataProvider {
    /// Fetches the most recent bars for every requested symbol.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BarSeries>)` - One series per symbol, in request order.
    /// * `Err(ProviderError)` - If any symbol cannot be served.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError>;
}

/// Descriptive details a terminal reports once connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalInfo {
    pub path: PathBuf,
    pub company: Option<String>,
    pub build: Option<u32>,
    pub connected: bool,
}

/// A data provider backed by a connection that has to be released.
pub trait Terminal: DataProvider {
    fn info(&self) -> TerminalInfo;

    /// Release the connection. Called exactly once by [`session::Session`].
    fn shutdown(&mut self);
}

/// Errors that can occur while opening a terminal.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// No path given and no environment variable to fall back on.
    #[snafu(display("No terminal path configured: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// The terminal directory does not exist.
    #[snafu(display("Terminal not found at {}", path.display()))]
    TerminalNotFound { path: PathBuf, backtrace: Backtrace },

    /// The terminal description file could not be read.
    #[snafu(display("Failed to read terminal info {}: {source}", path.display()))]
    InfoRead {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The terminal description file is not valid TOML.
    #[snafu(display("Invalid terminal info {}: {source}", path.display()))]
    InfoParse {
        path: PathBuf,
        source: toml::de::Error,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// The request parameters were invalid for this provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The provider has no data for the symbol at this timeframe.
    #[snafu(display("No {timeframe} data for {symbol} (looked for {})", path.display()))]
    SymbolNotFound {
        symbol: String,
        timeframe: String,
        path: PathBuf,
        backtrace: Backtrace,
    },

    /// The provider's data could not be decoded.
    #[snafu(display("Failed to load {symbol}: {source}"))]
    Read { symbol: String, source: ReadError },

    /// The terminal has already been shut down.
    #[snafu(display("Terminal is not connected"))]
    Disconnected { backtrace: Backtrace },
}
