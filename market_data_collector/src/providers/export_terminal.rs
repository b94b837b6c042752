//! Terminal backed by a directory of exported history files.
//!
//! Layout of the directory:
//!
//! ```text
//! <root>/terminal.toml      optional: company = "...", build = 4410
//! <root>/GOLD_M15.csv       one file per symbol and timeframe
//! <root>/USDJPY_H1.csv
//! ```
//!
//! Each CSV follows the format read by [`crate::io::bar_csv`]. A fetch returns
//! the most recent `count` rows of each requested file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use shared_utils::env::get_env_var;
use snafu::{ResultExt, ensure};
use tracing::{debug, info};

use crate::io::bar_csv::{OpenFileSnafu, ReadOptions, read_bars};
use crate::models::{
    bar_series::BarSeries, request_params::BarsRequestParams, timeframe::TimeFrame,
};
use crate::providers::{
    DataProvider, DisconnectedSnafu, InfoParseSnafu, InfoReadSnafu, MissingEnvVarSnafu,
    ProviderError, ProviderInitError, ReadSnafu, SymbolNotFoundSnafu, Terminal, TerminalInfo,
    TerminalNotFoundSnafu, ValidationSnafu,
};

/// Environment variable consulted when no terminal path is given.
pub const TERMINAL_PATH_VAR: &str = "MDC_TERMINAL_PATH";

const INFO_FILE: &str = "terminal.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InfoFile {
    company: Option<String>,
    build: Option<u32>,
}

pub struct ExportTerminal {
    info: TerminalInfo,
    read_options: ReadOptions,
}

impl ExportTerminal {
    /// Connect to the export directory at `path`, or at `$MDC_TERMINAL_PATH`
    /// when no path is given.
    pub fn open(path: Option<&Path>) -> Result<Self, ProviderInitError> {
        let root = match path {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(get_env_var(TERMINAL_PATH_VAR).context(MissingEnvVarSnafu)?),
        };
        ensure!(root.is_dir(), TerminalNotFoundSnafu { path: &root });

        let info_path = root.join(INFO_FILE);
        let details = if info_path.is_file() {
            let text = std::fs::read_to_string(&info_path).context(InfoReadSnafu {
                path: &info_path,
            })?;
            toml::from_str::<InfoFile>(&text).context(InfoParseSnafu { path: &info_path })?
        } else {
            InfoFile::default()
        };

        info!(path = %root.display(), "connected to export terminal");
        Ok(Self {
            info: TerminalInfo {
                path: root,
                company: details.company,
                build: details.build,
                connected: true,
            },
            read_options: ReadOptions::default(),
        })
    }

    /// How naive timestamps in the exported files are interpreted.
    pub fn with_read_options(mut self, read_options: ReadOptions) -> Self {
        self.read_options = read_options;
        self
    }

    pub fn series_path(&self, symbol: &str, timeframe: &TimeFrame) -> PathBuf {
        self.info
            .path
            .join(format!("{symbol}_{}.csv", timeframe.label()))
    }

    async fn fetch_one(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        count: usize,
    ) -> Result<BarSeries, ProviderError> {
        let path = self.series_path(symbol, &timeframe);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return SymbolNotFoundSnafu {
                    symbol,
                    timeframe: timeframe.label(),
                    path,
                }
                .fail();
            }
            Err(e) => {
                return Err(e)
                    .context(OpenFileSnafu { path: &path })
                    .context(ReadSnafu { symbol });
            }
        };

        let mut series = read_bars(&bytes[..], symbol, timeframe, &self.read_options)
            .context(ReadSnafu { symbol })?;
        series.keep_last(count);
        debug!(symbol, timeframe = %timeframe, bars = series.len(), "loaded export");
        Ok(series)
    }
}

#[async_trait]
impl DataProvider for ExportTerminal {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        ensure!(self.info.connected, DisconnectedSnafu);
        ensure!(
            !params.symbols.is_empty(),
            ValidationSnafu {
                message: "at least one symbol is required"
            }
        );
        ensure!(
            params.count > 0,
            ValidationSnafu {
                message: "bar count must be positive"
            }
        );

        let mut out = Vec::with_capacity(params.symbols.len());
        for symbol in &params.symbols {
            out.push(self.fetch_one(symbol, params.timeframe, params.count).await?);
        }
        Ok(out)
    }
}

impl Terminal for ExportTerminal {
    fn info(&self) -> TerminalInfo {
        self.info.clone()
    }

    fn shutdown(&mut self) {
        if self.info.connected {
            self.info.connected = false;
            debug!(path = %self.info.path.display(), "export terminal disconnected");
        }
    }
}
