//! Configuration for spread_scanner_rust

use anyhow::{anyhow, Result};
use gapcex_rust_core::{
    default_basket, parse_basket, ScanOptions, SourceConfig, DEFAULT_QUOTE, DEFAULT_TIMEOUT_MS,
};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow!("GAPCEX_OUTPUT must be 'table' or 'json', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    // Basket
    pub basket: Vec<String>,
    pub quote: String,

    // Sources
    pub timeout_ms: u64,
    pub rate_limit_enabled: bool,
    pub sources: Option<Vec<String>>,

    // Ranking
    pub min_spread_pct: Option<f64>,

    // Output
    pub top_n: usize,
    pub output: OutputFormat,
    pub progress_interval_ms: u64,
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (the process env in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let basket = match lookup("GAPCEX_ASSETS") {
            Some(raw) => parse_basket(&raw),
            None => default_basket(),
        };
        if basket.is_empty() {
            return Err(anyhow!("GAPCEX_ASSETS must list at least one asset"));
        }

        let quote = lookup("GAPCEX_QUOTE")
            .map(|q| q.trim().to_uppercase())
            .unwrap_or_else(|| DEFAULT_QUOTE.to_string());
        if quote.is_empty() {
            return Err(anyhow!("GAPCEX_QUOTE must not be empty"));
        }

        let timeout_ms = parse_u64(&lookup, "GAPCEX_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(anyhow!("GAPCEX_TIMEOUT_MS must be > 0"));
        }

        let min_spread_pct = match lookup("GAPCEX_MIN_SPREAD_PCT") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| anyhow!("GAPCEX_MIN_SPREAD_PCT must be a valid f64"))?,
            ),
            _ => None,
        };
        if let Some(pct) = min_spread_pct {
            if !pct.is_finite() || pct < 0.0 {
                return Err(anyhow!("GAPCEX_MIN_SPREAD_PCT must be >= 0"));
            }
        }

        let progress_interval_ms = parse_u64(&lookup, "GAPCEX_PROGRESS_INTERVAL_MS", 250)?;
        if progress_interval_ms == 0 {
            return Err(anyhow!("GAPCEX_PROGRESS_INTERVAL_MS must be > 0"));
        }

        let sources = lookup("GAPCEX_SOURCES")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());

        Ok(Self {
            basket,
            quote,
            timeout_ms,
            rate_limit_enabled: parse_bool(&lookup, "GAPCEX_RATE_LIMIT", true)?,
            sources,
            min_spread_pct,
            top_n: parse_u64(&lookup, "GAPCEX_TOP_N", 10)? as usize,
            output: lookup("GAPCEX_OUTPUT")
                .unwrap_or_else(|| "table".to_string())
                .parse()?,
            progress_interval_ms,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            basket: self.basket.clone(),
            quote: self.quote.clone(),
            source_config: SourceConfig::new(self.rate_limit_enabled, self.timeout()),
            sources: self.sources.clone(),
            min_spread_pct: self.min_spread_pct,
        }
    }
}

/// Parse variable as u64 with default fallback
fn parse_u64<F>(lookup: &F, var_name: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid u64", var_name)),
        None => Ok(default),
    }
}

/// Parse variable as bool with default fallback
fn parse_bool<F>(lookup: &F, var_name: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        Some(val) => match val.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(anyhow!("{} must be true or false", var_name)),
        },
        None => Ok(default),
    }
}
