//! Terminal and JSON rendering of scan results.
//!
//! Every renderer returns a `String`; printing is left to the binary.

use anyhow::Result;
use gapcex_rust_core::{OpportunityRow, ProgressSnapshot, RunSummary, ScanReport, SourceTally};
use serde::Serialize;
use std::collections::BTreeMap;

const TABLE_WIDTH: usize = 105;

/// Format a price for display
///
/// Small prices get fixed precision (10, 8 or 6 decimals below 0.0001,
/// 0.01 and 1). Larger ones use thousands separators and at most three
/// decimals.
pub fn format_price(price: f64) -> String {
    if price < 0.0001 {
        format!("{:.10}", price)
    } else if price < 0.01 {
        format!("{:.8}", price)
    } else if price < 1.0 {
        format!("{:.6}", price)
    } else {
        group_thousands(price)
    }
}

fn group_thousands(price: f64) -> String {
    let fixed = format!("{:.3}", price);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}

pub fn banner(assets: usize, sources: usize) -> String {
    format!(
        "\n🔍 GapCex - CEX Arbitrage Scanner\n{}\n📊 Coins: {} | 🏦 Exchanges: {} | 📡 Requests: {}\n",
        "━".repeat(34),
        assets,
        sources,
        assets * sources
    )
}

/// Single-line progress, meant to be redrawn in place with `\r`
pub fn progress_line(snapshot: &ProgressSnapshot, elapsed_secs: f64) -> String {
    format!(
        "⏳ Progress: {:.1}% ({}/{}) | ✅ Found: {} prices | ⏱️ {:.1}s",
        snapshot.percent(),
        snapshot.completed,
        snapshot.total,
        snapshot.found,
        elapsed_secs
    )
}

pub fn table_header() -> String {
    format!(
        "Coin     | Buy From        | Price         | Sell To         | Price         | Spread  | #\n{}",
        "━".repeat(TABLE_WIDTH)
    )
}

pub fn table_row(row: &OpportunityRow) -> String {
    format!(
        "{:<8} | {:<15} | ${:<12} | {:<15} | ${:<12} | {:>6.2}% | {}",
        row.asset,
        row.low_source,
        format_price(row.low_price),
        row.high_source,
        format_price(row.high_price),
        row.spread_pct,
        row.observation_count
    )
}

pub fn fetch_summary(summary: &RunSummary) -> String {
    format!(
        "✅ Fetched {} prices from {} exchanges",
        summary.found_count, summary.distinct_sources_with_hits
    )
}

pub fn run_summary(opportunities: usize, summary: &RunSummary) -> String {
    format!(
        "✅ Found {} coins with arbitrage opportunities in {:.1}s",
        opportunities, summary.elapsed_secs
    )
}

/// Numbered list of the `n` widest spreads; empty when there are none
pub fn top_list(rows: &[OpportunityRow], n: usize) -> String {
    if rows.is_empty() || n == 0 {
        return String::new();
    }

    let mut out = format!("🔥 Top {} Arbitrage Opportunities:", n);
    for (i, row) in rows.iter().take(n).enumerate() {
        out.push_str(&format!(
            "\n   {:>2}. {:<8} {:>6.2}% ({} → {})",
            i + 1,
            row.asset,
            row.spread_pct,
            row.low_source,
            row.high_source
        ));
    }
    out
}

/// Full table report as printed after a scan
pub fn render_table(report: &ScanReport, top_n: usize) -> String {
    let rows = report.rows();

    let mut lines = vec![fetch_summary(&report.summary), String::new(), table_header()];
    lines.extend(rows.iter().map(table_row));
    lines.push(String::new());
    lines.push(run_summary(rows.len(), &report.summary));

    let top = top_list(&rows, top_n);
    if !top.is_empty() {
        lines.push(String::new());
        lines.push(top);
    }

    lines.join("\n")
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: &'a RunSummary,
    opportunities: Vec<OpportunityRow>,
    sources: &'a BTreeMap<String, SourceTally>,
}

pub fn render_json(report: &ScanReport) -> Result<String> {
    let json = JsonReport {
        summary: &report.summary,
        opportunities: report.rows(),
        sources: &report.tallies,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
