//! spread_scanner_rust - GapCex CEX spread scanner service

pub mod config;
pub mod presentation;
pub mod progress;

pub use config::{OutputFormat, ScannerConfig};
pub use progress::ProgressReporter;
