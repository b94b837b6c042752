//! CSV encoding of bar series.
//!
//! Header layout: `time,datetime,open,high,low,close,volume`, where `time` is
//! unix seconds and `datetime` is `YYYY-mm-dd HH:MM:SS` in UTC. Only the value
//! columns present in the series are written, and blank cells stand for
//! missing values.
//!
//! Terminal exports also carry `spread` and `real_volume`, and name volume
//! `tick_volume`; those columns are read and written back under the header
//! they came with.
//!
//! The reader is more lenient: it needs `time` or `datetime` (preferring
//! `time`), matches headers case-insensitively, and treats `NA`, `NaN` and
//! `null` cells as blanks. Count columns (volumes, spread) accept integral
//! floats such as `311.0`, which is how pandas writes an integer column that
//! once held a NaN.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};

use crate::models::{
    bar::{Bar, Columns, PriceField, VolumeHeader},
    bar_series::BarSeries,
    timeframe::TimeFrame,
};
use crate::tz::{self, DstPolicy, TzError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ReadError {
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Malformed CSV: {source}"))]
    Csv {
        source: csv::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("CSV has neither a time nor a datetime column"))]
    MissingTimestampColumn { backtrace: Backtrace },

    #[snafu(display("Row {row}: {source}"))]
    Timestamp {
        row: usize,
        source: TzError,
        backtrace: Backtrace,
    },

    #[snafu(display("Row {row}: column {column} holds non-numeric value {value:?}"))]
    BadCell {
        row: usize,
        column: &'static str,
        value: String,
        backtrace: Backtrace,
    },
}

/// How naive `datetime` cells are interpreted.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub timezone: Tz,
    pub dst_policy: DstPolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            dst_policy: DstPolicy::Strict,
        }
    }
}

enum TimestampColumn {
    Unix(usize),
    Naive(usize),
}

struct Layout {
    timestamp: TimestampColumn,
    prices: [Option<usize>; 4],
    volume: Option<(usize, VolumeHeader)>,
    spread: Option<usize>,
    real_volume: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self, ReadError> {
        let find = |names: &[&str]| {
            names.iter().find_map(|name| {
                headers
                    .iter()
                    .position(|h| h.eq_ignore_ascii_case(name))
            })
        };
        let timestamp = match (find(&["time"]), find(&["datetime"])) {
            (Some(idx), _) => TimestampColumn::Unix(idx),
            (None, Some(idx)) => TimestampColumn::Naive(idx),
            (None, None) => return MissingTimestampColumnSnafu.fail(),
        };
        Ok(Self {
            timestamp,
            prices: PriceField::ALL.map(|field| find(&[field.name()])),
            volume: find(&["volume"])
                .map(|idx| (idx, VolumeHeader::Volume))
                .or_else(|| find(&["tick_volume"]).map(|idx| (idx, VolumeHeader::TickVolume))),
            spread: find(&["spread"]),
            real_volume: find(&["real_volume"]),
        })
    }

    fn columns(&self) -> Columns {
        let mut columns = Columns::NONE;
        for (field, idx) in PriceField::ALL.into_iter().zip(self.prices) {
            columns.set_price(field, idx.is_some());
        }
        if let Some((_, header)) = self.volume {
            columns.volume = true;
            columns.volume_header = header;
        }
        columns.spread = self.spread.is_some();
        columns.real_volume = self.real_volume.is_some();
        columns
    }
}

fn is_blank(cell: &str) -> bool {
    cell.is_empty()
        || ["na", "nan", "null"]
            .iter()
            .any(|token| cell.eq_ignore_ascii_case(token))
}

fn cell<'r>(record: &'r StringRecord, idx: Option<usize>) -> Option<&'r str> {
    idx.and_then(|i| record.get(i)).filter(|c| !is_blank(c))
}

/// Whole number, written either as an integer or as an integral float.
fn parse_whole(raw: &str) -> Option<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
    (v.is_finite() && v.fract() == 0.0 && in_range).then_some(v as i64)
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.parse::<u64>()
        .ok()
        .or_else(|| parse_whole(raw).and_then(|v| u64::try_from(v).ok()))
}

fn parse_timestamp(
    record: &StringRecord,
    layout: &Layout,
    options: &ReadOptions,
) -> Result<DateTime<Utc>, TzError> {
    let (idx, unix) = match layout.timestamp {
        TimestampColumn::Unix(idx) => (idx, true),
        TimestampColumn::Naive(idx) => (idx, false),
    };
    let raw = record.get(idx).unwrap_or_default();
    if unix {
        tz::parse_unix_seconds(raw)
    } else {
        tz::parse_datetime(raw, options.timezone, options.dst_policy)
    }
}

/// Read a bar series from CSV text.
pub fn read_bars<R: Read>(
    reader: R,
    symbol: &str,
    timeframe: TimeFrame,
    options: &ReadOptions,
) -> Result<BarSeries, ReadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let layout = Layout::from_headers(rdr.headers().context(CsvSnafu)?)?;

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let row = i + 1;
        let record = record.context(CsvSnafu)?;
        let timestamp =
            parse_timestamp(&record, &layout, options).context(TimestampSnafu { row })?;

        let mut bar = Bar {
            timestamp,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            spread: None,
            real_volume: None,
        };
        for (field, idx) in PriceField::ALL.into_iter().zip(layout.prices) {
            if let Some(raw) = cell(&record, idx) {
                let value = raw.parse::<f64>().ok().context(BadCellSnafu {
                    row,
                    column: field.name(),
                    value: raw,
                })?;
                *bar.price_mut(field) = Some(value);
            }
        }
        if let Some(raw) = cell(&record, layout.volume.map(|(idx, _)| idx)) {
            bar.volume = Some(parse_count(raw).context(BadCellSnafu {
                row,
                column: layout.columns().volume_header.name(),
                value: raw,
            })?);
        }
        if let Some(raw) = cell(&record, layout.spread) {
            bar.spread = Some(parse_whole(raw).context(BadCellSnafu {
                row,
                column: "spread",
                value: raw,
            })?);
        }
        if let Some(raw) = cell(&record, layout.real_volume) {
            bar.real_volume = Some(parse_count(raw).context(BadCellSnafu {
                row,
                column: "real_volume",
                value: raw,
            })?);
        }
        bars.push(bar);
    }

    Ok(BarSeries {
        symbol: symbol.to_string(),
        timeframe,
        columns: layout.columns(),
        bars,
    })
}

/// Read a bar series from a CSV file on disk.
pub fn read_bars_path(
    path: impl AsRef<Path>,
    symbol: &str,
    timeframe: TimeFrame,
    options: &ReadOptions,
) -> Result<BarSeries, ReadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).context(OpenFileSnafu { path })?;
    read_bars(file, symbol, timeframe, options)
}

/// Write `series` as CSV.
pub fn write_bars<W: Write>(writer: W, series: &BarSeries) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    let prices: Vec<PriceField> = series.columns.prices().collect();

    let mut header = vec!["time", "datetime"];
    header.extend(prices.iter().map(|f| f.name()));
    let columns = &series.columns;
    if columns.volume {
        header.push(columns.volume_header.name());
    }
    if columns.spread {
        header.push("spread");
    }
    if columns.real_volume {
        header.push("real_volume");
    }
    wtr.write_record(&header)?;

    for bar in &series.bars {
        let mut record = vec![
            bar.timestamp.timestamp().to_string(),
            tz::format_naive(bar.timestamp),
        ];
        record.extend(
            prices
                .iter()
                .map(|f| optional(bar.price(*f))),
        );
        if columns.volume {
            record.push(optional(bar.volume));
        }
        if columns.spread {
            record.push(optional(bar.spread));
        }
        if columns.real_volume {
            record.push(optional(bar.real_volume));
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Encode `series` as CSV bytes.
pub fn to_csv_bytes(series: &BarSeries) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    write_bars(&mut buf, series)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn m15() -> TimeFrame {
        TimeFrame::minutes(15).unwrap()
    }

    fn read(text: &str) -> Result<BarSeries, ReadError> {
        read_bars(text.as_bytes(), "GOLD", m15(), &ReadOptions::default())
    }

    #[test]
    fn reads_unix_time_and_blank_cells() {
        let text = "time,open,high,low,close,tick_volume\n\
                    1704067200,2062.5,2063.1,2061.9,2062.8,120\n\
                    1704068100,,2064.0,NaN,2063.2,\n";
        let series = read(text).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.columns,
            Columns {
                volume_header: VolumeHeader::TickVolume,
                ..Columns::OHLCV
            }
        );
        assert_eq!(
            series.bars[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(series.bars[0].volume, Some(120));
        assert_eq!(series.bars[1].open, None);
        assert_eq!(series.bars[1].low, None);
        assert_eq!(series.bars[1].volume, None);
    }

    #[test]
    fn terminal_export_keeps_every_field() {
        let text = "time,open,high,low,close,tick_volume,spread,real_volume\n\
                    1704067200,2062.5,2063.1,2061.9,2062.8,120,12,0\n\
                    1704067200,2062.5,2063.1,2061.9,2062.8,120,35,0\n\
                    1704068100,2062.8,2064.0,2062.0,2063.2,98,,0\n";
        let series = read(text).unwrap();
        assert_eq!(series.columns, Columns::TERMINAL);
        assert_eq!(series.bars[0].spread, Some(12));
        assert_eq!(series.bars[1].spread, Some(35));
        assert_eq!(series.bars[2].spread, None);
        assert_eq!(series.bars[2].real_volume, Some(0));

        let written = String::from_utf8(to_csv_bytes(&series).unwrap()).unwrap();
        assert!(
            written.starts_with(
                "time,datetime,open,high,low,close,tick_volume,spread,real_volume\n"
            ),
            "{written}"
        );
        let back = read_bars(written.as_bytes(), "GOLD", m15(), &ReadOptions::default()).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn integral_float_counts_are_accepted() {
        let text = "time,close,tick_volume,spread\n\
                    1704067200,1.0,311.0,12.0\n";
        let series = read(text).unwrap();
        assert_eq!(series.bars[0].volume, Some(311));
        assert_eq!(series.bars[0].spread, Some(12));
    }

    #[test]
    fn fractional_or_negative_volume_is_bad_cell() {
        for raw in ["311.5", "-3"] {
            let text = format!("time,close,tick_volume\n1704067200,1.0,{raw}\n");
            match read(&text).unwrap_err() {
                ReadError::BadCell { column, value, .. } => {
                    assert_eq!(column, "tick_volume");
                    assert_eq!(value, raw);
                }
                other => panic!("expected BadCell, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_columns_are_reported_absent() {
        let text = "Datetime,Close\n2024-01-01 00:00:00,10\n";
        let series = read(text).unwrap();
        let mut want = Columns::NONE;
        want.close = true;
        assert_eq!(series.columns, want);
        assert_eq!(series.bars[0].close, Some(10.0));
    }

    #[test]
    fn naive_datetimes_use_configured_zone() {
        let text = "datetime,close\n2024-01-15 09:30:00,1\n";
        let options = ReadOptions {
            timezone: tz::parse_zone("America/New_York").unwrap(),
            dst_policy: DstPolicy::Strict,
        };
        let series = read_bars(text.as_bytes(), "USDJPY", m15(), &options).unwrap();
        assert_eq!(
            series.bars[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap()
        );
    }

    #[test]
    fn dst_gap_surfaces_row_number() {
        let text = "datetime,close\n2024-03-10 01:30:00,1\n2024-03-10 02:30:00,1\n";
        let options = ReadOptions {
            timezone: tz::parse_zone("America/New_York").unwrap(),
            dst_policy: DstPolicy::Strict,
        };
        let err = read_bars(text.as_bytes(), "GOLD", m15(), &options).unwrap_err();
        assert!(matches!(err, ReadError::Timestamp { row: 2, .. }), "{err}");
    }

    #[test]
    fn non_numeric_price_is_bad_cell() {
        let text = "time,open,close\n1704067200,abc,1\n";
        match read(text).unwrap_err() {
            ReadError::BadCell {
                row, column, value, ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(column, "open");
                assert_eq!(value, "abc");
            }
            other => panic!("expected BadCell, got {other:?}"),
        }
    }

    #[test]
    fn timestamp_column_is_required() {
        let err = read("open,close\n1,2\n").unwrap_err();
        assert!(matches!(err, ReadError::MissingTimestampColumn { .. }));
    }

    #[test]
    fn written_csv_reads_back_identically() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let mut second = Bar::new(ts + chrono::TimeDelta::minutes(15), 1.5, 2.25, 1.0, 2.0, 7);
        second.high = None;
        let series = BarSeries::new(
            "EURJPY",
            m15(),
            vec![Bar::new(ts, 161.234, 161.5, 161.1, 161.42, 900), second],
        );

        let bytes = to_csv_bytes(&series).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("time,datetime,open,high,low,close,volume\n"));
        assert!(text.contains("2024-02-01 12:00:00"));

        let back = read_bars(&bytes[..], "EURJPY", m15(), &ReadOptions::default()).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn writer_skips_absent_columns() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let mut columns = Columns::NONE;
        columns.close = true;
        let series = BarSeries::new("GOLD", m15(), vec![Bar::new(ts, 1.0, 1.0, 1.0, 3.0, 1)])
            .with_columns(columns);
        let text = String::from_utf8(to_csv_bytes(&series).unwrap()).unwrap();
        assert_eq!(text, "time,datetime,close\n1706788800,2024-02-01 12:00:00,3\n");
    }
}
