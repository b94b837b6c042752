//! Collector configuration: parsing, defaults and overrides.
//!
//! A TOML file describes what to collect and where to put it:
//!
//! ```toml
//! data_dir = "data/raw"
//! terminal_path = "/srv/terminal/export"
//! symbols = ["GOLD", "USDJPY", "EURJPY"]
//! count = 1000
//! timezone = "Europe/Athens"
//! dst_policy = "prefer_earliest"
//!
//! [timeframe]
//! amount = 15
//! unit = "m"
//!
//! [quality]
//! lower_quantile = 0.01
//! upper_quantile = 0.99
//! ```
//!
//! Every field is optional. Precedence, lowest to highest: built-in defaults,
//! the file, environment (`MDC_TERMINAL_PATH`, `MDC_DATA_DIR`), then whatever
//! the CLI sets on the loaded value.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_utils::env::env_path_override;

use crate::io::bar_csv::ReadOptions;
use crate::models::timeframe::TimeFrame;
use crate::providers::export_terminal::TERMINAL_PATH_VAR;
use crate::tz::{DstPolicy, parse_zone};
use crate::validation::DatasetValidator;

/// Environment variable overriding [`CollectorConfig::data_dir`].
pub const DATA_DIR_VAR: &str = "MDC_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig {
    /// Where CSV files and metadata sidecars are written.
    pub data_dir: PathBuf,
    /// Terminal export directory. Falls back to `$MDC_TERMINAL_PATH`.
    pub terminal_path: Option<PathBuf>,
    pub symbols: Vec<String>,
    /// Most recent bars to pull per symbol.
    pub count: usize,
    pub timeframe: TimeframeCfg,
    /// IANA zone of naive timestamps in exported files.
    pub timezone: String,
    pub dst_policy: DstPolicy,
    pub quality: QualityCfg,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/raw"),
            terminal_path: None,
            symbols: vec!["GOLD".into(), "USDJPY".into(), "EURJPY".into()],
            count: 1000,
            timeframe: TimeframeCfg::default(),
            timezone: "UTC".into(),
            dst_policy: DstPolicy::Strict,
            quality: QualityCfg::default(),
        }
    }
}

/// Timeframe as written in config (amount + unit like "m", "h", "d").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimeframeCfg {
    pub amount: u32,
    pub unit: String,
}

impl Default for TimeframeCfg {
    fn default() -> Self {
        Self {
            amount: 15,
            unit: "m".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityCfg {
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

impl Default for QualityCfg {
    fn default() -> Self {
        let (lower_quantile, upper_quantile) = DatasetValidator::default().quantiles();
        Self {
            lower_quantile,
            upper_quantile,
        }
    }
}

impl CollectorConfig {
    /// Apply environment overrides in place.
    pub fn apply_env(&mut self) {
        if let Some(path) = env_path_override(TERMINAL_PATH_VAR) {
            self.terminal_path = Some(path);
        }
        if let Some(dir) = env_path_override(DATA_DIR_VAR) {
            self.data_dir = dir;
        }
    }

    pub fn timeframe(&self) -> anyhow::Result<TimeFrame> {
        TimeFrame::parse(self.timeframe.amount, &self.timeframe.unit)
            .with_context(|| format!("bad timeframe in config: {:?}", self.timeframe))
    }

    pub fn read_options(&self) -> anyhow::Result<ReadOptions> {
        Ok(ReadOptions {
            timezone: parse_zone(&self.timezone)?,
            dst_policy: self.dst_policy,
        })
    }

    pub fn validator(&self) -> anyhow::Result<DatasetValidator> {
        DatasetValidator::with_quantiles(self.quality.lower_quantile, self.quality.upper_quantile)
            .context("bad [quality] section")
    }

    /// Check that every derived setting parses and that there is work to do.
    pub fn check(&self) -> anyhow::Result<()> {
        self.timeframe()?;
        self.read_options()?;
        self.validator()?;
        anyhow::ensure!(!self.symbols.is_empty(), "no symbols configured");
        anyhow::ensure!(self.count > 0, "count must be positive");
        Ok(())
    }
}

/// Parse a configuration from a TOML string (no env overrides).
pub fn load_config_str(toml_str: &str) -> anyhow::Result<CollectorConfig> {
    let mut cfg: CollectorConfig =
        toml::from_str(toml_str).context("failed to parse collector TOML")?;
    cfg.symbols = cfg
        .symbols
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    cfg.check()?;
    Ok(cfg)
}

/// Load configuration: defaults when `path` is `None`, otherwise the file;
/// environment overrides are applied either way.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CollectorConfig> {
    let mut cfg = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config file {}", path.display()))?;
            load_config_str(&text)?
        }
        None => CollectorConfig::default(),
    };
    cfg.apply_env();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    use crate::models::timeframe::TimeFrameUnit;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = load_config_str("").unwrap();
        assert_eq!(cfg, CollectorConfig::default());
        assert_eq!(cfg.timeframe().unwrap(), TimeFrame::minutes(15).unwrap());
        assert_eq!(cfg.symbols, vec!["GOLD", "USDJPY", "EURJPY"]);
    }

    #[test]
    fn parses_full_file() {
        let cfg = load_config_str(
            r#"
            data_dir = "/tmp/out"
            symbols = [" GOLD ", ""]
            count = 250
            timezone = "Europe/Athens"
            dst_policy = "prefer_latest"

            [timeframe]
            amount = 1
            unit = "h"

            [quality]
            lower_quantile = 0.05
            "#,
        )
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.symbols, vec!["GOLD"]);
        assert_eq!(cfg.count, 250);
        assert_eq!(cfg.dst_policy, DstPolicy::PreferLatest);
        assert_eq!(cfg.timeframe().unwrap().unit, TimeFrameUnit::Hour);
        assert_eq!(cfg.validator().unwrap().quantiles(), (0.05, 0.99));
        assert_eq!(
            cfg.read_options().unwrap().timezone,
            chrono_tz::Europe::Athens
        );
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(load_config_str("symbol = \"GOLD\"").is_err());
        assert!(load_config_str("timezone = \"Nowhere/Special\"").is_err());
        assert!(load_config_str("[timeframe]\namount = 90\nunit = \"m\"").is_err());
        assert!(load_config_str("[quality]\nlower_quantile = 0.9\nupper_quantile = 0.1").is_err());
        assert!(load_config_str("symbols = []").is_err());
    }

    #[test]
    #[serial]
    fn env_overrides_file_values() {
        unsafe {
            std::env::set_var(TERMINAL_PATH_VAR, "/srv/export");
            std::env::set_var(DATA_DIR_VAR, "/srv/data");
        }
        let cfg = load_config(None).unwrap();
        unsafe {
            std::env::remove_var(TERMINAL_PATH_VAR);
            std::env::remove_var(DATA_DIR_VAR);
        }
        assert_eq!(cfg.terminal_path, Some(PathBuf::from("/srv/export")));
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/data"));
    }
}
