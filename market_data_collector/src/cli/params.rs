use std::path::Path;

use crate::config::CollectorConfig;

/// Split a comma-separated symbol list, dropping blanks.
pub fn parse_symbols(symbols: &str) -> Vec<String> {
    symbols
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Symbol for a CSV passed to `check`: the explicit one, else the file stem.
pub fn symbol_for_input(symbol: Option<&str>, input: &Path) -> String {
    symbol
        .map(str::to_string)
        .or_else(|| {
            input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// Apply `check` flags on top of the loaded config. A flag left out keeps the
/// configured value, so `--unit h` alone reuses the configured amount.
pub fn apply_check_overrides(
    cfg: &mut CollectorConfig,
    amount: Option<u32>,
    unit: Option<&str>,
    timezone: Option<&str>,
) {
    if let Some(amount) = amount {
        cfg.timeframe.amount = amount;
    }
    if let Some(unit) = unit {
        cfg.timeframe.unit = unit.to_string();
    }
    if let Some(tz) = timezone {
        cfg.timezone = tz.to_string();
    }
}

/// Apply `collect` flags on top of the loaded config.
pub fn apply_collect_overrides(
    cfg: &mut CollectorConfig,
    symbols: Option<&str>,
    count: Option<usize>,
    terminal: Option<&Path>,
    data_dir: Option<&Path>,
) {
    if let Some(symbols) = symbols {
        cfg.symbols = parse_symbols(symbols);
    }
    if let Some(count) = count {
        cfg.count = count;
    }
    if let Some(path) = terminal {
        cfg.terminal_path = Some(path.to_path_buf());
    }
    if let Some(dir) = data_dir {
        cfg.data_dir = dir.to_path_buf();
    }
}
