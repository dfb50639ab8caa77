use anyhow::Result;
use async_trait::async_trait;

use crate::likes::model::{InsertOutcome, LikeRecord};

#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn count_by_ticker(&self, stock_ticker: &str) -> Result<u64>;

    async fn find_one(&self, stock_ticker: &str, hashed_ip: &str) -> Result<Option<LikeRecord>>;

    /// Inserts the record, reporting `AlreadyExists` when the uniqueness
    /// constraint rejects it.
    async fn insert(&self, record: &LikeRecord) -> Result<InsertOutcome>;

    /// Removes every like. Test fixtures and admin tooling only.
    async fn clear(&self) -> Result<u64>;
}
