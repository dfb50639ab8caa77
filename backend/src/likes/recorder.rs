use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::likes::fingerprint::Fingerprinter;
use crate::likes::model::{InsertOutcome, LikeOutcome, LikeRecord};
use crate::likes::repository::LikeRepository;
use crate::logger::warn_if_slow;
use crate::quote::Quote;

/// Records at most one like per (ticker, caller fingerprint).
pub struct LikeRecorder {
    repo: Arc<dyn LikeRepository>,
    fingerprinter: Fingerprinter,
}

impl LikeRecorder {
    pub fn new(repo: Arc<dyn LikeRepository>, fingerprinter: Fingerprinter) -> Self {
        Self {
            repo,
            fingerprinter,
        }
    }

    /// Fingerprints the caller once, then checks and inserts every ticker
    /// concurrently. Outcomes are returned in quote order.
    #[instrument(skip(self, quotes, ip), fields(count = quotes.len()))]
    pub async fn record(
        &self,
        quotes: &[Quote],
        ip: IpAddr,
    ) -> Result<Vec<LikeOutcome>, AppError> {
        let hashed_ip = self.fingerprinter.fingerprint(ip).await?;

        let outcomes = try_join_all(
            quotes
                .iter()
                .map(|q| self.record_one(&q.symbol, &hashed_ip)),
        )
        .await
        .map_err(AppError::Store)?;

        info!(?outcomes, "likes recorded");

        Ok(outcomes)
    }

    async fn record_one(&self, ticker: &str, hashed_ip: &str) -> anyhow::Result<LikeOutcome> {
        let existing = warn_if_slow("like_find", Duration::from_millis(100), async {
            self.repo.find_one(ticker, hashed_ip).await
        })
        .await?;

        if existing.is_some() {
            debug!(ticker, "already liked");
            return Ok(LikeOutcome::AlreadyLiked);
        }

        let record = LikeRecord::new(ticker, hashed_ip);
        let outcome = warn_if_slow("like_insert", Duration::from_millis(100), async {
            self.repo.insert(&record).await
        })
        .await?;

        Ok(match outcome {
            InsertOutcome::Inserted => LikeOutcome::Recorded,
            InsertOutcome::AlreadyExists => {
                debug!(ticker, "concurrent request recorded the like first");
                LikeOutcome::LostRace
            }
        })
    }
}
