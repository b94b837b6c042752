use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the collector config file (TOML). Built-in defaults when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the quality check on a saved CSV file
    Check {
        /// CSV file with a `time` or `datetime` column
        #[arg(long)]
        input: PathBuf,

        /// Symbol to label the series with (defaults to the file stem)
        #[arg(long)]
        symbol: Option<String>,

        /// Timeframe amount (numeric value); defaults to the config's [timeframe]
        #[arg(long)]
        amount: Option<u32>,

        /// Timeframe unit: m (minute), h (hour), d (day), w (week), mo (month)
        #[arg(long)]
        unit: Option<String>,

        /// IANA zone for naive datetimes (e.g. "Europe/Athens"); overrides config
        #[arg(long)]
        timezone: Option<String>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Pull recent bars from the terminal, check and save them
    Collect {
        /// Comma-separated list of symbols (e.g. "GOLD,USDJPY")
        #[arg(long)]
        symbols: Option<String>,

        /// Number of most recent bars per symbol
        #[arg(long)]
        count: Option<usize>,

        /// Terminal export directory
        #[arg(long)]
        terminal: Option<PathBuf>,

        /// Output directory for CSV and metadata files
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}
