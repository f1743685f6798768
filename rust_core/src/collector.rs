//! Fan-Out Collector
//!
//! Issues one bounded fetch per (asset, source) pair, all at once, and waits
//! for every one of them to settle. Each fetch runs as its own tokio task and
//! reports its outcome over a channel to a single aggregating loop, which is
//! the only writer of the price book, the per-source tallies and the
//! progress counters.

use crate::book::PriceBook;
use crate::fetch::bounded_fetch;
use crate::models::{FetchOutcome, MarketSymbol, SourceTally};
use crate::registry::SourceRegistry;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

// ============================================================================
// Progress
// ============================================================================

/// Live request counters, readable from any task while a collection runs
#[derive(Debug, Default)]
pub struct FetchProgress {
    total: AtomicU64,
    completed: AtomicU64,
    found: AtomicU64,
}

impl FetchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&self, total: u64) {
        self.completed.store(0, Ordering::Release);
        self.found.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
    }

    fn record(&self, outcome: &FetchOutcome) {
        // completed before found keeps found <= completed for readers
        self.completed.fetch_add(1, Ordering::AcqRel);
        if outcome.is_found() {
            self.found.fetch_add(1, Ordering::AcqRel);
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let found = self.found.load(Ordering::Acquire);
        ProgressSnapshot {
            total: self.total.load(Ordering::Acquire),
            completed: self.completed.load(Ordering::Acquire),
            found,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.snapshot().is_complete()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total: u64,
    pub completed: u64,
    pub found: u64,
}

impl ProgressSnapshot {
    /// Completed share of all requests, 0-100
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

// ============================================================================
// Collection
// ============================================================================

/// One settled fetch, sent from its task to the aggregator
#[derive(Debug)]
struct FetchReport {
    asset: String,
    source: String,
    outcome: FetchOutcome,
}

/// Result of a finished fetch phase
#[derive(Debug, Clone)]
pub struct Collection {
    pub book: PriceBook,
    pub completed: u64,
    pub found: u64,
    /// Outcome counts for every registered source, including silent ones
    pub tallies: BTreeMap<String, SourceTally>,
}

impl Collection {
    /// Number of sources that produced at least one observation
    pub fn distinct_sources(&self) -> usize {
        self.book.distinct_sources().len()
    }

    pub fn timed_out(&self) -> u64 {
        self.tallies.values().map(|t| t.timed_out).sum()
    }

    pub fn failed(&self) -> u64 {
        self.tallies.values().map(|t| t.failed).sum()
    }
}

pub struct FanOutCollector {
    deadline: Duration,
    quote: String,
    progress: Arc<FetchProgress>,
}

impl FanOutCollector {
    pub fn new(deadline: Duration, quote: impl Into<String>) -> Self {
        Self {
            deadline,
            quote: quote.into(),
            progress: Arc::new(FetchProgress::new()),
        }
    }

    /// Shared handle to the live counters
    pub fn progress(&self) -> Arc<FetchProgress> {
        self.progress.clone()
    }

    /// Fetch every asset in `basket` from every source in `registry`
    ///
    /// Returns once all `assets × sources` fetches have settled. Failures
    /// and timeouts are counted but never retried.
    pub async fn collect<S: AsRef<str>>(&self, basket: &[S], registry: &SourceRegistry) -> Collection {
        let mut book = PriceBook::new(basket);
        let symbols: Vec<MarketSymbol> = book
            .assets()
            .iter()
            .map(|asset| MarketSymbol::new(asset.as_str(), self.quote.as_str()))
            .collect();

        let total = (symbols.len() * registry.len()) as u64;
        self.progress.reset(total);

        let mut tallies: BTreeMap<String, SourceTally> = registry
            .ids()
            .into_iter()
            .map(|id| (id.to_string(), SourceTally::default()))
            .collect();

        info!(
            "Fetching {} assets from {} sources ({} requests, deadline {:?})",
            symbols.len(),
            registry.len(),
            total,
            self.deadline
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<FetchReport>();

        for symbol in &symbols {
            for (source_id, source) in registry.iter() {
                let tx = tx.clone();
                let source = Arc::clone(source);
                let source_id = source_id.to_string();
                let symbol = symbol.clone();
                let deadline = self.deadline;

                tokio::spawn(async move {
                    let outcome = AssertUnwindSafe(bounded_fetch(
                        source.as_ref(),
                        &source_id,
                        &symbol,
                        deadline,
                    ))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| FetchOutcome::Failed("fetch task panicked".to_string()));

                    // Receiver outlives every sender; a send error means the
                    // collection was abandoned.
                    let _ = tx.send(FetchReport {
                        asset: symbol.base,
                        source: source_id,
                        outcome,
                    });
                });
            }
        }
        drop(tx);

        let mut completed = 0u64;
        let mut found = 0u64;

        while let Some(report) = rx.recv().await {
            self.progress.record(&report.outcome);
            completed += 1;

            tallies
                .entry(report.source)
                .or_default()
                .record(&report.outcome);

            if let Some(obs) = report.outcome.into_observation() {
                if book.record(obs) {
                    found += 1;
                }
            } else {
                debug!("No price for {} ({}/{})", report.asset, completed, total);
            }
        }

        let collection = Collection {
            book,
            completed,
            found,
            tallies,
        };

        debug!(
            "Fetch phase done: {} completed, {} found, {} timed out, {} failed",
            collection.completed,
            collection.found,
            collection.timed_out(),
            collection.failed()
        );

        collection
    }
}
