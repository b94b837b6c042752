use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use market_data_collector::cli::commands::{Cli, Commands};
use market_data_collector::cli::params::{
    apply_check_overrides, apply_collect_overrides, symbol_for_input,
};
use market_data_collector::collector::{collect_all, open_session};
use market_data_collector::config::{CollectorConfig, load_config};
use market_data_collector::io::{bar_csv::read_bars_path, sink::CsvSink};
use market_data_collector::models::request_params::BarsRequestParams;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries reports and saved paths.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            input,
            symbol,
            amount,
            unit,
            timezone,
            json,
        } => {
            apply_check_overrides(&mut cfg, amount, unit.as_deref(), timezone.as_deref());
            let timeframe = cfg.timeframe()?;
            let options = cfg.read_options()?;

            let symbol = symbol_for_input(symbol.as_deref(), &input);
            let series = read_bars_path(&input, &symbol, timeframe, &options)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let report = cfg.validator()?.validate_timeframe(&series)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }

        Commands::Collect {
            symbols,
            count,
            terminal,
            data_dir,
        } => {
            apply_collect_overrides(
                &mut cfg,
                symbols.as_deref(),
                count,
                terminal.as_deref(),
                data_dir.as_deref(),
            );
            run_collect(&cfg).await?;
        }
    }
    Ok(())
}

async fn run_collect(cfg: &CollectorConfig) -> anyhow::Result<()> {
    cfg.check()?;
    let validator = cfg.validator()?;
    let params = BarsRequestParams {
        symbols: cfg.symbols.clone(),
        timeframe: cfg.timeframe()?,
        count: cfg.count,
    };

    let read_options = cfg.read_options()?;
    let session = open_session(cfg.terminal_path.as_deref(), read_options)
        .context("could not open terminal")?;
    let sink = CsvSink::new(&cfg.data_dir);
    info!(data_dir = %sink.data_dir().display(), symbols = params.symbols.len(), "collecting");

    let outcomes = collect_all(&*session, &validator, &sink, &params).await;
    session.close();

    let mut success_count = 0;
    let mut error_count = 0;
    for (symbol, result) in outcomes {
        match result {
            Ok(collected) => {
                eprintln!("{symbol}\n{}", collected.report);
                println!("{}", collected.output.data_path.display());
                success_count += 1;
            }
            Err(e) => {
                eprintln!("ERROR: {symbol} - {e}");
                error_count += 1;
            }
        }
    }

    // Summary goes to stderr so stdout stays a plain list of paths.
    eprintln!("SUMMARY: {success_count} succeeded, {error_count} failed");
    Ok(())
}
