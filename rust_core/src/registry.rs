//! Price Source Registry
//!
//! A [`SourceTable`] is the static list of known sources: identifier plus
//! constructor. [`SourceRegistry::build`] runs every constructor once with
//! the run's [`SourceConfig`] and keeps the handles that came up. Sources
//! that fail to construct are skipped and contribute nothing to the run.

use crate::clients::{
    BinanceClient, BitfinexClient, BitgetClient, BybitClient, CoinbaseClient, CryptocomClient,
    GateioClient, HtxClient, KrakenClient, KucoinClient, MexcClient, OkxClient, PriceSource,
    SourceConfig,
};
use crate::errors::SourceError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds one client handle from the run's source configuration
pub type SourceConstructor =
    Arc<dyn Fn(&SourceConfig) -> Result<Arc<dyn PriceSource>, SourceError> + Send + Sync>;

/// Known sources, keyed by identifier
#[derive(Clone, Default)]
pub struct SourceTable {
    entries: BTreeMap<String, SourceConstructor>,
}

impl SourceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table listing every built-in exchange client
    pub fn builtin() -> Self {
        Self::new()
            .with("binance", |c| Ok(Arc::new(BinanceClient::new(c)?)))
            .with("bitfinex", |c| Ok(Arc::new(BitfinexClient::new(c)?)))
            .with("bitget", |c| Ok(Arc::new(BitgetClient::new(c)?)))
            .with("bybit", |c| Ok(Arc::new(BybitClient::new(c)?)))
            .with("coinbase", |c| Ok(Arc::new(CoinbaseClient::new(c)?)))
            .with("cryptocom", |c| Ok(Arc::new(CryptocomClient::new(c)?)))
            .with("gateio", |c| Ok(Arc::new(GateioClient::new(c)?)))
            .with("htx", |c| Ok(Arc::new(HtxClient::new(c)?)))
            .with("kraken", |c| Ok(Arc::new(KrakenClient::new(c)?)))
            .with("kucoin", |c| Ok(Arc::new(KucoinClient::new(c)?)))
            .with("mexc", |c| Ok(Arc::new(MexcClient::new(c)?)))
            .with("okx", |c| Ok(Arc::new(OkxClient::new(c)?)))
    }

    /// Register a constructor, replacing any existing entry with the same id
    pub fn register<F>(&mut self, id: &str, constructor: F)
    where
        F: Fn(&SourceConfig) -> Result<Arc<dyn PriceSource>, SourceError> + Send + Sync + 'static,
    {
        self.entries.insert(id.to_string(), Arc::new(constructor));
    }

    /// Builder-style [`register`](Self::register)
    pub fn with<F>(mut self, id: &str, constructor: F) -> Self
    where
        F: Fn(&SourceConfig) -> Result<Arc<dyn PriceSource>, SourceError> + Send + Sync + 'static,
    {
        self.register(id, constructor);
        self
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Keep only the entries named in `allow` (case-insensitive)
    ///
    /// Returns the allow-list entries that matched nothing in the table.
    pub fn retain_only<S: AsRef<str>>(&mut self, allow: &[S]) -> Vec<String> {
        let wanted: Vec<String> = allow
            .iter()
            .map(|id| id.as_ref().trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect();

        let unknown: Vec<String> = wanted
            .iter()
            .filter(|id| !self.entries.contains_key(id.as_str()))
            .cloned()
            .collect();

        self.entries.retain(|id, _| wanted.contains(id));

        if !unknown.is_empty() {
            warn!("Ignoring unknown sources in allow-list: {:?}", unknown);
        }
        unknown
    }
}

impl std::fmt::Debug for SourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTable")
            .field("ids", &self.ids())
            .finish()
    }
}

/// Constructed source handles for one run, iterated in identifier order
pub struct SourceRegistry {
    sources: BTreeMap<String, Arc<dyn PriceSource>>,
    skipped: Vec<String>,
}

impl SourceRegistry {
    /// Construct every source in `table` with `config`
    ///
    /// Handles are labelled with their table identifier. Construction
    /// failures are logged at debug level and the source is left out.
    pub fn build(table: &SourceTable, config: &SourceConfig) -> Self {
        let mut sources = BTreeMap::new();
        let mut skipped = Vec::new();

        for (id, constructor) in &table.entries {
            match constructor(config) {
                Ok(source) => {
                    sources.insert(id.clone(), source);
                }
                Err(e) => {
                    debug!("Skipping source {}: {}", id, e);
                    skipped.push(id.clone());
                }
            }
        }

        info!(
            "SourceRegistry initialized with {} of {} sources",
            sources.len(),
            table.len()
        );

        Self { sources, skipped }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn PriceSource>> {
        self.sources.get(id).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn PriceSource>)> {
        self.sources.iter().map(|(id, source)| (id.as_str(), source))
    }

    /// Identifiers whose constructor failed
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}
