//! Spread scanner pipeline
//!
//! Runs one scan end to end: validate inputs, construct the sources, fan
//! out the fetches, freeze the book, rank. Phases advance strictly
//! `Idle -> Fetching -> Collected -> Ranked -> Done`; a scanner runs once.

use crate::basket::{default_basket, DEFAULT_QUOTE};
use crate::book::PriceBook;
use crate::clients::SourceConfig;
use crate::collector::{FanOutCollector, FetchProgress};
use crate::errors::ScanError;
use crate::models::{Opportunity, OpportunityRow, RunSummary, ScanPhase, SourceTally};
use crate::ranker::SpreadRanker;
use crate::registry::{SourceRegistry, SourceTable};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Inputs for one scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Assets to scan, in display order
    pub basket: Vec<String>,
    /// Quote currency every asset is priced in
    pub quote: String,
    /// Per-call timeout (also the fetch deadline) and rate limiting
    pub source_config: SourceConfig,
    /// Restrict construction to these source ids
    pub sources: Option<Vec<String>>,
    /// Keep only spreads strictly above this percentage
    pub min_spread_pct: Option<f64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            basket: default_basket(),
            quote: DEFAULT_QUOTE.to_string(),
            source_config: SourceConfig::default(),
            sources: None,
            min_spread_pct: None,
        }
    }
}

/// Everything a finished scan produced
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Ranked by spread, widest first
    pub opportunities: Vec<Opportunity>,
    pub summary: RunSummary,
    pub tallies: BTreeMap<String, SourceTally>,
    pub book: PriceBook,
}

impl ScanReport {
    pub fn rows(&self) -> Vec<OpportunityRow> {
        self.opportunities.iter().map(Opportunity::to_row).collect()
    }
}

pub struct SpreadScanner {
    options: ScanOptions,
    table: SourceTable,
    collector: FanOutCollector,
    phase: Arc<RwLock<ScanPhase>>,
}

impl SpreadScanner {
    pub fn new(options: ScanOptions, table: SourceTable) -> Self {
        let collector = FanOutCollector::new(options.source_config.timeout, options.quote.clone());
        Self {
            options,
            table,
            collector,
            phase: Arc::new(RwLock::new(ScanPhase::Idle)),
        }
    }

    /// Live fetch counters; valid before and during [`run`](Self::run)
    pub fn progress(&self) -> Arc<FetchProgress> {
        self.collector.progress()
    }

    pub fn phase(&self) -> ScanPhase {
        *self.phase.read()
    }

    /// Shared handle for observing the phase while the scan runs
    pub fn phase_handle(&self) -> Arc<RwLock<ScanPhase>> {
        self.phase.clone()
    }

    fn advance(&self, next: ScanPhase) {
        let mut phase = self.phase.write();
        info!("Scan phase: {} -> {}", *phase, next);
        *phase = next;
    }

    /// Run the scan to completion
    ///
    /// Only an empty basket or an empty source table fail, and both fail
    /// before any request is sent. Individual fetch failures never surface.
    pub async fn run(mut self) -> Result<ScanReport, ScanError> {
        let started = Instant::now();

        let basket = PriceBook::new(&self.options.basket).assets().to_vec();
        if basket.is_empty() {
            return Err(ScanError::EmptyBasket);
        }

        if let Some(allow) = &self.options.sources {
            self.table.retain_only(allow);
        }
        if self.table.is_empty() {
            return Err(ScanError::NoSources);
        }

        self.advance(ScanPhase::Fetching);

        let registry = SourceRegistry::build(&self.table, &self.options.source_config);
        if registry.is_empty() {
            warn!(
                "None of the {} sources could be constructed; scan will be empty",
                self.table.len()
            );
        }

        let collection = self.collector.collect(&basket, &registry).await;
        self.advance(ScanPhase::Collected);

        let ranker = SpreadRanker::with_min_spread(self.options.min_spread_pct);
        let opportunities = ranker.rank(&collection.book);
        self.advance(ScanPhase::Ranked);

        let summary = RunSummary {
            total_requests: (basket.len() * registry.len()) as u64,
            completed_requests: collection.completed,
            found_count: collection.found,
            distinct_sources_with_hits: collection.distinct_sources(),
            elapsed_secs: started.elapsed().as_secs_f64(),
            sources_constructed: registry.len(),
            timed_out: collection.timed_out(),
            failed: collection.failed(),
        };

        info!(
            "Scan finished: {} opportunities from {} prices across {} sources in {:.1}s",
            opportunities.len(),
            summary.found_count,
            summary.distinct_sources_with_hits,
            summary.elapsed_secs
        );

        self.advance(ScanPhase::Done);

        Ok(ScanReport {
            opportunities,
            summary,
            tallies: collection.tallies,
            book: collection.book,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::PriceSource;
    use crate::errors::SourceError;
    use crate::models::MarketSymbol;
    use async_trait::async_trait;

    struct Flat(f64);

    #[async_trait]
    impl PriceSource for Flat {
        fn source_id(&self) -> &str {
            "flat"
        }

        fn market_id(&self, symbol: &MarketSymbol) -> String {
            symbol.base_upper()
        }

        async fn fetch_last_price(&self, _symbol: &MarketSymbol) -> Result<f64, SourceError> {
            Ok(self.0)
        }
    }

    fn options(basket: &[&str]) -> ScanOptions {
        ScanOptions {
            basket: basket.iter().map(|s| s.to_string()).collect(),
            ..ScanOptions::default()
        }
    }

    fn table() -> SourceTable {
        SourceTable::new()
            .with("low", |_| Ok(Arc::new(Flat(10.0))))
            .with("high", |_| Ok(Arc::new(Flat(11.0))))
    }

    #[tokio::test]
    async fn test_run_walks_every_phase() {
        let scanner = SpreadScanner::new(options(&["BTC", "ETH"]), table());
        let phase = scanner.phase_handle();
        assert_eq!(scanner.phase(), ScanPhase::Idle);

        let report = scanner.run().await.unwrap();

        assert_eq!(*phase.read(), ScanPhase::Done);
        assert_eq!(report.opportunities.len(), 2);
        assert_eq!(report.summary.total_requests, 4);
        assert_eq!(report.summary.completed_requests, 4);
        assert_eq!(report.summary.sources_constructed, 2);

        let row = &report.rows()[0];
        assert_eq!(row.low_source, "low");
        assert_eq!(row.high_source, "high");
    }

    #[tokio::test]
    async fn test_empty_basket_is_rejected() {
        let scanner = SpreadScanner::new(options(&[]), table());
        let progress = scanner.progress();

        assert_eq!(scanner.run().await.unwrap_err(), ScanError::EmptyBasket);
        assert_eq!(progress.snapshot().total, 0);
    }

    #[tokio::test]
    async fn test_allow_list_without_matches_is_no_sources() {
        let mut opts = options(&["BTC"]);
        opts.sources = Some(vec!["ftx".to_string()]);

        let err = SpreadScanner::new(opts, table()).run().await.unwrap_err();
        assert_eq!(err, ScanError::NoSources);
    }

    #[tokio::test]
    async fn test_allow_list_restricts_sources() {
        let mut opts = options(&["BTC"]);
        opts.sources = Some(vec!["LOW".to_string()]);

        let report = SpreadScanner::new(opts, table()).run().await.unwrap();
        assert_eq!(report.summary.sources_constructed, 1);
        assert!(report.opportunities.is_empty());
        assert_eq!(report.book.observations("BTC").len(), 1);
    }
}
