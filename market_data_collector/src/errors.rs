use thiserror::Error;

use crate::io::sink::SinkError;
use crate::providers::{ProviderError, ProviderInitError};
use crate::validation::ValidationError;

/// The unified error type for the `market_data_collector` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A terminal could not be opened.
    #[error("Terminal error: {0}")]
    Terminal(#[from] ProviderInitError),

    /// An error originating from a data provider (missing symbol, bad file).
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// An error originating from a data sink (e.g., file I/O).
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// The dataset could not be validated.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The provider answered without a series for the requested symbol.
    #[error("Provider returned no series for {symbol}")]
    EmptyResponse { symbol: String },
}
