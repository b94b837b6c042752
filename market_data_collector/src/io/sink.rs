use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use snafu::{Backtrace, ResultExt, Snafu};
use tracing::debug;

use crate::io::{bar_csv, metadata::SeriesMetadata, metadata::STAMP_FORMAT};
use crate::models::bar_series::BarSeries;
use crate::validation::QualityReport;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The output directory could not be created.
    #[snafu(display("Failed to create directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// An error occurred while writing a file.
    #[snafu(display("Failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The series could not be encoded as CSV.
    #[snafu(display("CSV encoding error: {source}"))]
    Encode {
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// The metadata sidecar could not be serialized.
    #[snafu(display("Metadata serialization error: {source}"))]
    Metadata {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the paths it created; a database sink might return
    /// the number of rows inserted.
    type Output;

    /// Persist one series together with its quality report.
    async fn write(
        &self,
        series: &BarSeries,
        quality: &QualityReport,
    ) -> Result<Self::Output, SinkError>;
}

/// Files written for one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFiles {
    pub data_path: PathBuf,
    pub meta_path: PathBuf,
}

/// Writes `<SYMBOL>_<TF>_sample_<stamp>.csv` plus a `_meta.json` sidecar
/// into a data directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct CsvSink {
    data_dir: PathBuf,
}

impl CsvSink {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Same as [`DataSink::write`] with an explicit creation time.
    pub async fn write_at(
        &self,
        series: &BarSeries,
        quality: &QualityReport,
        created_at: DateTime<Utc>,
    ) -> Result<SavedFiles, SinkError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .context(CreateDirSnafu {
                path: &self.data_dir,
            })?;

        let stem = format!(
            "{}_{}_sample_{}",
            series.symbol,
            series.timeframe.label(),
            created_at.format(STAMP_FORMAT)
        );
        let data_path = self.data_dir.join(format!("{stem}.csv"));
        let meta_path = self.data_dir.join(format!("{stem}_meta.json"));

        let csv_bytes = bar_csv::to_csv_bytes(series).context(EncodeSnafu)?;
        tokio::fs::write(&data_path, csv_bytes)
            .await
            .context(WriteFileSnafu { path: &data_path })?;

        let meta = SeriesMetadata::new(series, quality, created_at);
        let meta_bytes = serde_json::to_vec_pretty(&meta).context(MetadataSnafu)?;
        tokio::fs::write(&meta_path, meta_bytes)
            .await
            .context(WriteFileSnafu { path: &meta_path })?;

        debug!(path = %data_path.display(), bars = series.len(), "wrote series");
        Ok(SavedFiles {
            data_path,
            meta_path,
        })
    }
}

#[async_trait]
impl DataSink for CsvSink {
    type Output = SavedFiles;

    async fn write(
        &self,
        series: &BarSeries,
        quality: &QualityReport,
    ) -> Result<SavedFiles, SinkError> {
        self.write_at(series, quality, Utc::now()).await
    }
}
