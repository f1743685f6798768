//! Scanner Pipeline Tests
//!
//! End-to-end scans against in-process price sources. The last test hits
//! real exchanges and should be run with `cargo test --ignored`.

use async_trait::async_trait;
use gapcex_rust_core::{
    FetchOutcome, MarketSymbol, PriceSource, ScanError, ScanOptions, ScanPhase, SourceConfig,
    SourceError, SourceTable, SpreadScanner,
};
use spread_scanner_rust::presentation::{render_json, render_table};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Answers from a fixed price list; unknown assets are errors
struct FakeExchange {
    id: &'static str,
    prices: HashMap<&'static str, f64>,
    calls: Arc<AtomicU64>,
}

impl FakeExchange {
    fn new(id: &'static str, prices: &[(&'static str, f64)]) -> Self {
        Self {
            id,
            prices: prices.iter().copied().collect(),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[async_trait]
impl PriceSource for FakeExchange {
    fn source_id(&self) -> &str {
        self.id
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        format!("{}{}", symbol.base_upper(), symbol.quote_upper())
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prices
            .get(symbol.base.as_str())
            .copied()
            .ok_or_else(|| SourceError::missing_price(self.id, &self.market_id(symbol)))
    }
}

/// Never answers within any reasonable deadline
struct StalledExchange;

#[async_trait]
impl PriceSource for StalledExchange {
    fn source_id(&self) -> &str {
        "stalled"
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        symbol.to_string()
    }

    async fn fetch_last_price(&self, _symbol: &MarketSymbol) -> Result<f64, SourceError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(1.0)
    }
}

fn options(basket: &[&str], deadline: Duration) -> ScanOptions {
    ScanOptions {
        basket: basket.iter().map(|s| s.to_string()).collect(),
        quote: "USDT".to_string(),
        source_config: SourceConfig::new(false, deadline),
        sources: None,
        min_spread_pct: None,
    }
}

fn three_exchanges() -> SourceTable {
    SourceTable::new()
        .with("alpha", |_| {
            Ok(Arc::new(FakeExchange::new("alpha", &[("BTC", 100.0), ("ETH", 50.0)])))
        })
        .with("bravo", |_| Ok(Arc::new(FakeExchange::new("bravo", &[("BTC", 102.0)]))))
        .with("charlie", |_| Ok(Arc::new(FakeExchange::new("charlie", &[("BTC", 98.0)]))))
}

#[tokio::test]
async fn test_btc_eth_scenario() {
    let scanner = SpreadScanner::new(options(&["BTC", "ETH"], Duration::from_secs(1)), three_exchanges());
    let report = scanner.run().await.unwrap();

    assert_eq!(report.opportunities.len(), 1);
    let btc = &report.opportunities[0];
    assert_eq!(btc.asset, "BTC");
    assert_eq!(btc.low.price, 98.0);
    assert_eq!(btc.low.source, "charlie");
    assert_eq!(btc.high.price, 102.0);
    assert_eq!(btc.high.source, "bravo");
    assert_eq!(btc.observation_count, 3);
    assert!((btc.spread_pct - 4.08).abs() < 0.01);

    let summary = &report.summary;
    assert_eq!(summary.total_requests, 6);
    assert_eq!(summary.completed_requests, 6);
    assert_eq!(summary.found_count, 4);
    assert_eq!(summary.distinct_sources_with_hits, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.timed_out, 0);

    // ETH has a single observation: kept in the book, excluded from ranking
    assert_eq!(report.book.observations("ETH").len(), 1);
}

#[tokio::test]
async fn test_stalled_source_times_out_without_blocking_the_run() {
    let table = three_exchanges().with("stalled", |_| Ok(Arc::new(StalledExchange)));
    let scanner = SpreadScanner::new(options(&["BTC", "ETH"], Duration::from_millis(100)), table);
    let progress = scanner.progress();

    let report = tokio::time::timeout(Duration::from_secs(10), scanner.run())
        .await
        .expect("scan must finish once every deadline has expired")
        .unwrap();

    assert_eq!(report.summary.completed_requests, 8);
    assert_eq!(report.summary.found_count, 4);
    assert_eq!(report.summary.timed_out, 2);
    assert_eq!(report.tallies["stalled"].timed_out, 2);
    assert_eq!(report.tallies["stalled"].found, 0);
    assert_eq!(report.book.observations("BTC").len(), 3);

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.completed, snapshot.total);
    assert_eq!(snapshot.found, 4);
}

#[tokio::test]
async fn test_completed_is_assets_times_sources() {
    let basket = ["BTC", "ETH", "SOL", "XRP", "DOGE"];
    let report = SpreadScanner::new(options(&basket, Duration::from_secs(1)), three_exchanges())
        .run()
        .await
        .unwrap();

    assert_eq!(report.summary.total_requests, 15);
    assert_eq!(report.summary.completed_requests, 15);
    assert_eq!(
        report.tallies.values().map(|t| t.attempts()).sum::<u64>(),
        15
    );
}

#[tokio::test]
async fn test_each_pair_is_fetched_exactly_once() {
    let exchange = FakeExchange::new("alpha", &[("BTC", 100.0)]);
    let calls = exchange.calls.clone();
    let shared: Arc<dyn PriceSource> = Arc::new(exchange);

    let table = SourceTable::new().with("alpha", move |_| Ok(shared.clone()));
    SpreadScanner::new(options(&["BTC", "ETH", "SOL"], Duration::from_secs(1)), table)
        .run()
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_no_source_constructs() {
    let table = SourceTable::new()
        .with("alpha", |_| Err(SourceError::construction("alpha", "unsupported")))
        .with("bravo", |_| Err(SourceError::construction("bravo", "unsupported")));

    let scanner = SpreadScanner::new(options(&["BTC", "ETH"], Duration::from_secs(1)), table);
    let phase = scanner.phase_handle();
    let report = scanner.run().await.unwrap();

    assert_eq!(*phase.read(), ScanPhase::Done);
    assert!(report.opportunities.is_empty());
    assert!(report.book.is_empty());
    assert_eq!(report.summary.sources_constructed, 0);
    assert_eq!(report.summary.total_requests, 0);
    assert_eq!(report.summary.completed_requests, 0);
}

#[tokio::test]
async fn test_failed_construction_is_excluded() {
    let table = three_exchanges()
        .with("broken", |_| Err(SourceError::construction("broken", "no spot market")));

    let report = SpreadScanner::new(options(&["BTC"], Duration::from_secs(1)), table)
        .run()
        .await
        .unwrap();

    assert_eq!(report.summary.sources_constructed, 3);
    assert_eq!(report.summary.total_requests, 3);
    assert!(!report.tallies.contains_key("broken"));
}

#[tokio::test]
async fn test_ranking_order_and_threshold() {
    let table = SourceTable::new()
        .with("alpha", |_| {
            Ok(Arc::new(FakeExchange::new(
                "alpha",
                &[("BTC", 100.0), ("ETH", 10.0), ("SOL", 20.0)],
            )))
        })
        .with("bravo", |_| {
            Ok(Arc::new(FakeExchange::new(
                "bravo",
                &[("BTC", 101.0), ("ETH", 12.0), ("SOL", 21.0)],
            )))
        });

    let report = SpreadScanner::new(options(&["BTC", "ETH", "SOL"], Duration::from_secs(1)), table.clone())
        .run()
        .await
        .unwrap();
    let assets: Vec<&str> = report.opportunities.iter().map(|o| o.asset.as_str()).collect();
    assert_eq!(assets, vec!["ETH", "SOL", "BTC"]);
    for pair in report.opportunities.windows(2) {
        assert!(pair[0].spread_pct >= pair[1].spread_pct);
    }

    let mut opts = options(&["BTC", "ETH", "SOL"], Duration::from_secs(1));
    opts.min_spread_pct = Some(2.0);
    let report = SpreadScanner::new(opts, table).run().await.unwrap();
    let assets: Vec<&str> = report.opportunities.iter().map(|o| o.asset.as_str()).collect();
    assert_eq!(assets, vec!["ETH", "SOL"]);
}

#[tokio::test]
async fn test_empty_basket_fails_before_fetching() {
    let exchange = FakeExchange::new("alpha", &[("BTC", 100.0)]);
    let calls = exchange.calls.clone();
    let shared: Arc<dyn PriceSource> = Arc::new(exchange);
    let table = SourceTable::new().with("alpha", move |_| Ok(shared.clone()));

    let err = SpreadScanner::new(options(&[], Duration::from_secs(1)), table)
        .run()
        .await
        .unwrap_err();

    assert_eq!(err, ScanError::EmptyBasket);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_table_is_no_sources() {
    let err = SpreadScanner::new(options(&["BTC"], Duration::from_secs(1)), SourceTable::new())
        .run()
        .await
        .unwrap_err();
    assert_eq!(err, ScanError::NoSources);
}

#[tokio::test]
async fn test_reports_render() {
    let report = SpreadScanner::new(options(&["BTC", "ETH"], Duration::from_secs(1)), three_exchanges())
        .run()
        .await
        .unwrap();

    let table = render_table(&report, 10);
    assert!(table.contains("✅ Fetched 4 prices from 3 exchanges"));
    assert!(table.contains("BTC      | charlie         | $98"));
    assert!(table.contains("✅ Found 1 coins with arbitrage opportunities"));
    assert!(table.contains("1. BTC"));

    let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
    assert_eq!(json["summary"]["completed_requests"], 6);
    assert_eq!(json["opportunities"][0]["asset"], "BTC");
    assert_eq!(json["opportunities"][0]["high_source"], "bravo");
    assert_eq!(json["sources"]["bravo"]["failed"], 1);
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_live_scan_against_builtin_exchanges() {
    let mut opts = options(&["BTC", "ETH"], Duration::from_secs(4));
    opts.source_config = SourceConfig::default();

    let report = SpreadScanner::new(opts, SourceTable::builtin())
        .run()
        .await
        .unwrap();

    println!(
        "Fetched {} prices from {} exchanges",
        report.summary.found_count, report.summary.distinct_sources_with_hits
    );
    for opp in &report.opportunities {
        assert!(opp.low.price <= opp.high.price);
        println!("  {} {:.2}% ({} -> {})", opp.asset, opp.spread_pct, opp.low.source, opp.high.source);
    }
    assert_eq!(report.summary.completed_requests, report.summary.total_requests);
}

#[test]
fn test_fetch_outcome_only_found_carries_price() {
    assert!(FetchOutcome::TimedOut.into_observation().is_none());
    assert!(FetchOutcome::Failed("HTTP 503".to_string()).into_observation().is_none());
}
