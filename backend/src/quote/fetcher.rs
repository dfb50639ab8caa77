use futures::future::try_join_all;
use tracing::{info, instrument, warn};

use crate::quote::client::QuoteSource;
use crate::quote::errors::QuoteError;
use crate::quote::types::{Quote, QuoteEnvelope, UNKNOWN_SYMBOL_SENTINELS};

/// Resolves every ticker concurrently and returns quotes in request order.
///
/// A transport or status failure on any lookup rejects the whole batch as soon as
/// it happens. Unknown-symbol bodies are only judged once every lookup has
/// settled; the first offending ticker in request order is reported.
#[instrument(skip(source), fields(count = tickers.len()))]
pub async fn fetch_quotes(
    source: &dyn QuoteSource,
    tickers: &[String],
) -> Result<Vec<Quote>, QuoteError> {
    let envelopes = try_join_all(tickers.iter().map(|t| source.fetch_quote(t))).await?;

    let quotes = tickers
        .iter()
        .zip(envelopes)
        .map(|(ticker, envelope)| resolve(ticker, envelope))
        .collect::<Result<Vec<_>, _>>()?;

    let symbols: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
    info!(?symbols, "quotes resolved");

    Ok(quotes)
}

fn resolve(ticker: &str, envelope: QuoteEnvelope) -> Result<Quote, QuoteError> {
    match envelope {
        QuoteEnvelope::Message(msg) if UNKNOWN_SYMBOL_SENTINELS.contains(&msg.as_str()) => {
            Err(QuoteError::UnknownSymbol(ticker.to_string()))
        }
        QuoteEnvelope::Message(msg) => {
            Err(invalid_response(ticker, format!("unexpected message body {msg:?}")))
        }
        QuoteEnvelope::Quote(raw) => match raw.price() {
            Some(price) => Ok(Quote {
                symbol: raw.symbol,
                price,
            }),
            None => Err(invalid_response(ticker, "quote carries no price".to_string())),
        },
    }
}

// The display string is user-facing and omits the reason, so it is logged here.
fn invalid_response(ticker: &str, reason: String) -> QuoteError {
    warn!(ticker, %reason, "unexpected quote response");
    QuoteError::InvalidResponse {
        ticker: ticker.to_string(),
        reason,
    }
}
