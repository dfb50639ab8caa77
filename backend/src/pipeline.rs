//! Per-request pipeline: fetch quotes → record likes → aggregate counts.
//!
//! Each stage takes the previous stage's value and returns a new one; nothing is
//! accumulated in shared state. Stage N+1 only starts once stage N has fully
//! completed, so the aggregate always sees likes recorded by the same request.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{Instrument, instrument};
use url::form_urlencoded;

use crate::error::AppError;
use crate::likes::aggregator::{StockData, aggregate};
use crate::likes::recorder::LikeRecorder;
use crate::likes::repository::LikeRepository;
use crate::likes::Fingerprinter;
use crate::quote::{QuoteSource, fetch_quotes};

pub const MAX_TICKERS: usize = 2;

/// Parsed `?stock=..&stock=..&like=..` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockQuery {
    pub tickers: Vec<String>,
    pub like: bool,
}

impl StockQuery {
    /// Keeps the first two non-blank `stock` values in order. `like` counts only
    /// when it appears exactly once with the value `true`.
    pub fn from_query_string(query: &str) -> Result<Self, AppError> {
        let mut tickers = Vec::with_capacity(MAX_TICKERS);
        let mut likes = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "stock" => {
                    let ticker = value.trim();
                    if !ticker.is_empty() && tickers.len() < MAX_TICKERS {
                        tickers.push(ticker.to_string());
                    }
                }
                "like" => likes.push(value.into_owned()),
                _ => {}
            }
        }

        if tickers.is_empty() {
            return Err(AppError::MissingTicker);
        }

        Ok(Self {
            tickers,
            like: matches!(likes.as_slice(), [only] if only == "true"),
        })
    }
}

/// Wires the three stages to their collaborators.
pub struct StockService {
    quotes: Arc<dyn QuoteSource>,
    likes: Arc<dyn LikeRepository>,
    recorder: LikeRecorder,
}

impl StockService {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        likes: Arc<dyn LikeRepository>,
        fingerprinter: Fingerprinter,
    ) -> Self {
        let recorder = LikeRecorder::new(likes.clone(), fingerprinter);
        Self {
            quotes,
            likes,
            recorder,
        }
    }

    /// `client_ip` is only required when the query opts in to liking.
    #[instrument(skip_all, fields(tickers = ?query.tickers, like = query.like))]
    pub async fn handle(
        &self,
        query: &StockQuery,
        client_ip: Option<IpAddr>,
    ) -> Result<StockData, AppError> {
        let quotes = fetch_quotes(self.quotes.as_ref(), &query.tickers)
            .instrument(common::logger::child_span("fetch"))
            .await?;

        if query.like {
            let ip = client_ip.ok_or(AppError::MissingClientAddr)?;
            self.recorder
                .record(&quotes, ip)
                .instrument(common::logger::child_span("like"))
                .await?;
        }

        aggregate(self.likes.as_ref(), quotes)
            .instrument(common::logger::child_span("aggregate"))
            .await
            .map_err(AppError::Store)
    }
}
