#[cfg(feature = "cli")]
pub mod cli;
pub mod collector;
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod providers;
pub mod tz;
pub mod validation;
