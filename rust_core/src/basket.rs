//! Asset basket configuration.

/// Top coins by market cap, stablecoins excluded
pub const DEFAULT_BASKET: &[&str] = &[
    "BTC", "ETH", "XRP", "BNB", "SOL", "TRX", "DOGE", "ADA", "BCH", "LINK",
    "HYPE", "ZEC", "LEO", "XMR", "XLM", "SUI", "LTC", "AVAX", "CC", "HBAR",
    "SHIB", "WLFI", "TON", "CRO", "UNI", "DOT", "MNT", "PEPE", "TAO", "AAVE",
    "BGB", "OKB", "NEAR", "ETC", "M", "ASTER", "ENA", "XAUt", "PI", "ICP",
    "PAXG", "WLD", "NIGHT", "MYX", "KCS", "SKY", "APT", "ONDO", "KAS", "POL",
    "ARB", "ALGO", "ATOM", "FIL", "TRUMP", "BONK", "VET", "XDC", "QNT", "RENDER",
    "FLR", "GT", "PUMP", "SEI", "PENGU", "IP", "CAKE", "JUP", "LIT", "CRV",
    "OP", "NEXO", "STX", "XTZ", "SPX", "FET", "VIRTUAL", "IMX", "FLOKI", "DASH",
    "LDO", "AERO", "ETHFI", "INJ", "PIPPIN", "TIA", "CHZ", "2Z", "STRK",
];

pub const DEFAULT_QUOTE: &str = "USDT";

pub fn default_basket() -> Vec<String> {
    DEFAULT_BASKET.iter().map(|s| s.to_string()).collect()
}

/// Parse a comma-separated basket, trimming blanks and dropping repeats
///
/// Order of first appearance is kept. Symbols keep their case (`XAUt`).
pub fn parse_basket(raw: &str) -> Vec<String> {
    let mut basket: Vec<String> = Vec::new();
    for asset in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !basket.iter().any(|a| a == asset) {
            basket.push(asset.to_string());
        }
    }
    basket
}
