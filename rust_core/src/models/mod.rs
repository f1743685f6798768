// Shared models for the GapCex scanner
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Market Symbols
// ============================================================================

/// Unified market pair requested from a price source, rendered `BASE/QUOTE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketSymbol {
    pub base: String,
    pub quote: String,
}

impl MarketSymbol {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    pub fn base_upper(&self) -> String {
        self.base.to_uppercase()
    }

    pub fn quote_upper(&self) -> String {
        self.quote.to_uppercase()
    }
}

impl fmt::Display for MarketSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

// ============================================================================
// Observations & Fetch Outcomes
// ============================================================================

/// A single successful last-price lookup. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub source: String,
    pub asset: String,
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    pub fn new(source: impl Into<String>, asset: impl Into<String>, price: f64) -> Self {
        Self {
            source: source.into(),
            asset: asset.into(),
            price,
            observed_at: Utc::now(),
        }
    }
}

/// Result of one bounded fetch. Only `Found` contributes to the price book.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Observation),
    TimedOut,
    Failed(String),
}

impl FetchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, FetchOutcome::Found(_))
    }

    pub fn into_observation(self) -> Option<Observation> {
        match self {
            FetchOutcome::Found(obs) => Some(obs),
            FetchOutcome::TimedOut | FetchOutcome::Failed(_) => None,
        }
    }
}

/// Per-source outcome counts, kept for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTally {
    pub found: u64,
    pub timed_out: u64,
    pub failed: u64,
}

impl SourceTally {
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Found(_) => self.found += 1,
            FetchOutcome::TimedOut => self.timed_out += 1,
            FetchOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn attempts(&self) -> u64 {
        self.found + self.timed_out + self.failed
    }
}

// ============================================================================
// Opportunities & Presentation Handoff
// ============================================================================

/// Cross-source price dispersion for one asset.
///
/// `low.price <= high.price` always holds and `spread_pct` is measured
/// relative to the low price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub asset: String,
    pub low: Observation,
    pub high: Observation,
    pub spread_pct: f64,
    pub observation_count: usize,
}

impl Opportunity {
    pub fn to_row(&self) -> OpportunityRow {
        OpportunityRow {
            asset: self.asset.clone(),
            low_source: self.low.source.clone(),
            low_price: self.low.price,
            high_source: self.high.source.clone(),
            high_price: self.high.price,
            spread_pct: self.spread_pct,
            observation_count: self.observation_count,
        }
    }
}

/// Flat row handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRow {
    pub asset: String,
    pub low_source: String,
    pub low_price: f64,
    pub high_source: String,
    pub high_price: f64,
    pub spread_pct: f64,
    pub observation_count: usize,
}

/// Run-level counters handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_requests: u64,
    pub completed_requests: u64,
    pub found_count: u64,
    pub distinct_sources_with_hits: usize,
    pub elapsed_secs: f64,
    pub sources_constructed: usize,
    pub timed_out: u64,
    pub failed: u64,
}

// ============================================================================
// Pipeline Phase
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    Fetching,
    Collected,
    Ranked,
    Done,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Fetching => "fetching",
            ScanPhase::Collected => "collected",
            ScanPhase::Ranked => "ranked",
            ScanPhase::Done => "done",
        }
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
