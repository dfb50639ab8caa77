use thiserror::Error;

/// Failures of the quote stage. Every variant is answered to the caller as an
/// `{ "error": .. }` body, so the display strings are user-facing.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Bad status when trying to get stock info - stock price API may be down")]
    BadStatus(reqwest::StatusCode),

    #[error("Could not reach stock price API - stock price API may be down")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from stock price API for ticker {ticker}")]
    InvalidResponse { ticker: String, reason: String },

    #[error("Stock ticker {0} could not be found by API - please check ticker is correct")]
    UnknownSymbol(String),

    #[error("invalid quote API base url: {0}")]
    InvalidBaseUrl(String),
}
