use futures::future::try_join_all;
use serde::Serialize;
use tracing::instrument;

use crate::likes::repository::LikeRepository;
use crate::quote::Quote;

/// One entry of the `stockData` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockResult {
    pub stock: String,
    pub price: f64,
    pub likes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_likes: Option<i64>,
}

/// `stockData` payload: a bare object for one ticker, a two-element array for two.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StockData {
    Single(StockResult),
    Pair([StockResult; 2]),
}

/// Each side's likes minus the other side's.
pub fn relative_likes(a: u64, b: u64) -> (i64, i64) {
    let diff = a as i64 - b as i64;
    (diff, -diff)
}

/// Counts the stored likes of every quoted ticker and shapes the response.
/// Must run after like recording has completed so fresh likes are counted.
#[instrument(skip_all, fields(count = quotes.len()))]
pub async fn aggregate(repo: &dyn LikeRepository, quotes: Vec<Quote>) -> anyhow::Result<StockData> {
    let counts = try_join_all(quotes.iter().map(|q| repo.count_by_ticker(&q.symbol))).await?;

    let mut results = quotes.into_iter().zip(counts).map(|(q, likes)| StockResult {
        stock: q.symbol,
        price: q.price,
        likes,
        rel_likes: None,
    });

    match (results.next(), results.next(), results.next()) {
        (Some(only), None, None) => Ok(StockData::Single(only)),
        (Some(mut first), Some(mut second), None) => {
            let (rel_first, rel_second) = relative_likes(first.likes, second.likes);
            first.rel_likes = Some(rel_first);
            second.rel_likes = Some(rel_second);
            Ok(StockData::Pair([first, second]))
        }
        _ => Err(anyhow::anyhow!("expected one or two quotes to aggregate")),
    }
}
