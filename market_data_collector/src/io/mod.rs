//! Persistence of bar series: CSV encoding, JSON metadata sidecars and the
//! [`DataSink`](sink::DataSink) abstraction.

pub mod bar_csv;
pub mod metadata;
pub mod sink;
