pub mod binance;
pub mod bitfinex;
pub mod bitget;
pub mod bybit;
pub mod coinbase;
pub mod cryptocom;
pub mod gateio;
pub mod htx;
pub mod kraken;
pub mod kucoin;
pub mod mexc;
pub mod okx;
pub mod price_source;
pub mod rest;
pub mod throttle;

// Re-export commonly used types
pub use binance::BinanceClient;
pub use bitfinex::BitfinexClient;
pub use bitget::BitgetClient;
pub use bybit::BybitClient;
pub use coinbase::CoinbaseClient;
pub use cryptocom::CryptocomClient;
pub use gateio::GateioClient;
pub use htx::HtxClient;
pub use kraken::KrakenClient;
pub use kucoin::KucoinClient;
pub use mexc::MexcClient;
pub use okx::OkxClient;
pub use price_source::{parse_price, validate_price, PriceSource, SourceConfig, DEFAULT_TIMEOUT_MS};
pub use rest::RestClient;
pub use throttle::Throttle;
