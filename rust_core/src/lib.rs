//! GapCex Core - concurrent multi-exchange price collection and spread ranking.
//!
//! This crate provides:
//! - Public REST clients for the built-in exchanges behind one `PriceSource` trait
//! - A static source table and the per-run source registry
//! - Deadline-bounded price fetches that never fail the caller
//! - A fan-out collector with live progress counters
//! - The price book and the spread ranker
//! - The `SpreadScanner` pipeline tying them together

pub mod basket;
pub mod book;
pub mod clients;
pub mod collector;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod ranker;
pub mod registry;
pub mod scanner;

pub use basket::{default_basket, parse_basket, DEFAULT_BASKET, DEFAULT_QUOTE};
pub use book::PriceBook;
pub use clients::{PriceSource, SourceConfig, DEFAULT_TIMEOUT_MS};
pub use collector::{Collection, FanOutCollector, FetchProgress, ProgressSnapshot};
pub use errors::{ScanError, SourceError};
pub use fetch::bounded_fetch;
pub use models::*;
pub use ranker::SpreadRanker;
pub use registry::{SourceConstructor, SourceRegistry, SourceTable};
pub use scanner::{ScanOptions, ScanReport, SpreadScanner};
