use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::logger::warn_if_slow;
use crate::quote::errors::QuoteError;
use crate::quote::types::QuoteEnvelope;

/// One upstream lookup per ticker. Transport and status failures are errors; an
/// "unknown symbol" body is a successful lookup and is judged by the fetcher.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, ticker: &str) -> Result<QuoteEnvelope, QuoteError>;
}

#[derive(Clone)]
pub struct QuoteClient {
    http: Client,
    base: Url,
}

impl QuoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, QuoteError> {
        let base =
            Url::parse(base_url).map_err(|_| QuoteError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(QuoteError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base })
    }

    fn quote_url(&self, ticker: &str) -> Result<Url, QuoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| QuoteError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["v1", "stock", ticker, "quote"]);
        Ok(url)
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    #[instrument(skip(self), fields(ticker = %ticker), level = "debug")]
    async fn fetch_quote(&self, ticker: &str) -> Result<QuoteEnvelope, QuoteError> {
        let url = self.quote_url(ticker)?;

        let resp = warn_if_slow("quote_fetch", Duration::from_millis(1_500), async {
            self.http.get(url).send().await
        })
        .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(%status, "quote service answered with non-200 status");
            return Err(QuoteError::BadStatus(status));
        }

        let envelope: QuoteEnvelope = resp.json().await.map_err(|e| QuoteError::InvalidResponse {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        })?;

        debug!(?envelope, "quote fetched");

        Ok(envelope)
    }
}
