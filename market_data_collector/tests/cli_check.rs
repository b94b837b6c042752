#![cfg(feature = "cli")]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const HOURLY: &str = "datetime,close\n\
    2024-01-15 10:00:00,10\n\
    2024-01-15 11:00:00,10\n\
    2024-01-15 12:00:00,10\n\
    2024-01-15 13:00:00,10\n";

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_market-data-collector"))
        .args(args)
        .env_remove("MDC_TERMINAL_PATH")
        .env_remove("MDC_DATA_DIR")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run market-data-collector")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn write_files(dir: &Path) -> (String, String) {
    let input = dir.join("GOLD_H1.csv");
    let config = dir.join("collector.toml");
    std::fs::write(&input, HOURLY).unwrap();
    std::fs::write(&config, "[timeframe]\namount = 1\nunit = \"h\"\n").unwrap();
    (
        input.to_string_lossy().into_owned(),
        config.to_string_lossy().into_owned(),
    )
}

#[test]
fn check_uses_configured_timeframe() {
    let dir = tempdir().unwrap();
    let (input, config) = write_files(dir.path());

    let out = stdout(&run(&["--config", &config, "check", "--input", &input]));
    insta::assert_snapshot!(out.trim_end(), @r"
Data quality check:
  rows: 4
  missing values: 0
  duplicate rows: 0
  close outliers: 0
  irregular intervals: 0
");
}

#[test]
fn check_flags_override_configured_timeframe() {
    let dir = tempdir().unwrap();
    let (input, config) = write_files(dir.path());

    let out = stdout(&run(&[
        "--config", &config, "check", "--input", &input, "--amount", "15", "--unit", "m",
    ]));
    assert!(out.contains("irregular intervals: 3"), "{out}");
}

#[test]
fn check_without_config_defaults_to_fifteen_minutes() {
    let dir = tempdir().unwrap();
    let (input, _) = write_files(dir.path());

    let out = stdout(&run(&["check", "--input", &input, "--json"]));
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["total_count"], 4);
    assert_eq!(report["irregular_intervals"], 3);
    assert_eq!(report["outliers"]["close"], 0);
}

#[test]
fn check_fails_on_missing_input() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.csv");

    let output = run(&["check", "--input", &missing.to_string_lossy()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
