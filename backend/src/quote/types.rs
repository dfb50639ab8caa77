use serde::Deserialize;

/// Bodies the quote service answers with for unrecognised tickers.
pub const UNKNOWN_SYMBOL_SENTINELS: [&str; 2] = ["Unknown symbol", "Invalid symbol"];

/// Raw `/v1/stock/{ticker}/quote` body: either a quote object or a bare JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuoteEnvelope {
    Quote(RawQuote),
    Message(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    pub symbol: String,

    pub iex_realtime_price: Option<f64>,
    pub latest_price: Option<f64>,
}

impl RawQuote {
    /// Realtime price, or the latest close when no realtime print exists.
    pub fn price(&self) -> Option<f64> {
        self.iex_realtime_price.or(self.latest_price)
    }
}

/// Resolved price for one requested ticker. `symbol` is the upstream's canonical
/// spelling, which is also the key likes are stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
}
