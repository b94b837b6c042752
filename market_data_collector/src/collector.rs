//! Fetch, check and persist pipeline.
//!
//! Each symbol goes through the same steps: pull the most recent bars from a
//! [`DataProvider`], run the [`DatasetValidator`] against the series'
//! timeframe, then hand series and report to a [`DataSink`]. A batch keeps
//! going after a failed symbol and reports every outcome.

use std::path::Path;

use tracing::{info, warn};

use crate::errors::Error;
use crate::io::{bar_csv::ReadOptions, sink::DataSink};
use crate::models::{request_params::BarsRequestParams, timeframe::TimeFrame};
use crate::providers::{DataProvider, export_terminal::ExportTerminal, session::Session};
use crate::validation::{DatasetValidator, QualityReport};

/// Open the export terminal at `path` (or `$MDC_TERMINAL_PATH`) inside a
/// [`Session`]. Nothing fallible runs between connecting and handing the
/// terminal to the session.
pub fn open_session(
    path: Option<&Path>,
    read_options: ReadOptions,
) -> Result<Session<ExportTerminal>, Error> {
    let terminal = ExportTerminal::open(path)?.with_read_options(read_options);
    Ok(Session::open(terminal))
}

/// A symbol that made it through the whole pipeline.
#[derive(Debug, Clone)]
pub struct Collected<O> {
    pub symbol: String,
    pub report: QualityReport,
    /// Whatever the sink handed back (paths for [`crate::io::sink::CsvSink`]).
    pub output: O,
}

/// Outcome of one symbol in a batch, tagged with the symbol it belongs to.
pub type SymbolOutcome<O> = (String, Result<Collected<O>, Error>);

pub async fn collect_symbol<P, S>(
    provider: &P,
    validator: &DatasetValidator,
    sink: &S,
    symbol: &str,
    timeframe: TimeFrame,
    count: usize,
) -> Result<Collected<S::Output>, Error>
where
    P: DataProvider + ?Sized,
    S: DataSink + ?Sized,
{
    let series = provider
        .fetch_bars(BarsRequestParams::single(symbol, timeframe, count))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::EmptyResponse {
            symbol: symbol.to_string(),
        })?;
    info!(symbol, timeframe = %timeframe, bars = series.len(), "fetched bars");

    let report = validator.validate_timeframe(&series)?;
    info!(
        symbol,
        rows = report.total_count,
        missing = report.missing_values,
        duplicates = report.duplicates,
        outliers = report.total_outliers(),
        irregular = report.irregular_intervals,
        "quality check"
    );

    let output = sink.write(&series, &report).await?;
    Ok(Collected {
        symbol: symbol.to_string(),
        report,
        output,
    })
}

/// Run [`collect_symbol`] for every symbol in `params`, in order.
pub async fn collect_all<P, S>(
    provider: &P,
    validator: &DatasetValidator,
    sink: &S,
    params: &BarsRequestParams,
) -> Vec<SymbolOutcome<S::Output>>
where
    P: DataProvider + ?Sized,
    S: DataSink + ?Sized,
{
    let mut outcomes = Vec::with_capacity(params.symbols.len());
    for symbol in &params.symbols {
        let result = collect_symbol(
            provider,
            validator,
            sink,
            symbol,
            params.timeframe,
            params.count,
        )
        .await;
        if let Err(e) = &result {
            warn!(symbol = %symbol, error = %e, "symbol failed");
        }
        outcomes.push((symbol.clone(), result));
    }

    let ok = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
    info!(succeeded = ok, failed = outcomes.len() - ok, "batch finished");
    outcomes
}
