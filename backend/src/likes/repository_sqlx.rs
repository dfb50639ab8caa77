use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{AnyPool, Row};
use tracing::debug;

use crate::likes::model::{InsertOutcome, LikeRecord};
use crate::likes::repository::LikeRepository;

/// SQLx-backed implementation of LikeRepository.
/// Responsible only for persistence and row mapping.
pub struct SqlxLikeRepository {
    pool: AnyPool,
}

impl SqlxLikeRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for SqlxLikeRepository {
    async fn count_by_ticker(&self, stock_ticker: &str) -> anyhow::Result<u64> {
        let row = sqlx::query(
            r#"
SELECT COUNT(*) AS likes
FROM stock_likes
WHERE stock_ticker = ?;
"#,
        )
        .bind(stock_ticker)
        .fetch_one(&self.pool)
        .await?;

        i64_to_u64(row.try_get("likes")?)
    }

    async fn find_one(
        &self,
        stock_ticker: &str,
        hashed_ip: &str,
    ) -> anyhow::Result<Option<LikeRecord>> {
        let row = sqlx::query(
            r#"
SELECT stock_ticker, hashed_ip
FROM stock_likes
WHERE stock_ticker = ? AND hashed_ip = ?
LIMIT 1;
"#,
        )
        .bind(stock_ticker)
        .bind(hashed_ip)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_like(&r)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: &LikeRecord) -> anyhow::Result<InsertOutcome> {
        let res = sqlx::query(
            r#"
INSERT INTO stock_likes (stock_ticker, hashed_ip)
VALUES (?, ?);
"#,
        )
        .bind(record.stock_ticker.as_str())
        .bind(record.hashed_ip.as_str())
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!(ticker = %record.stock_ticker, "insert rejected by unique index");
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM stock_likes;")
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected())
    }
}

/* =========================
Row mapping + conversions
========================= */

fn row_to_like(r: &sqlx::any::AnyRow) -> anyhow::Result<LikeRecord> {
    Ok(LikeRecord {
        stock_ticker: r.try_get("stock_ticker")?,
        hashed_ip: r.try_get("hashed_ip")?,
    })
}

fn i64_to_u64(v: i64) -> anyhow::Result<u64> {
    if v < 0 {
        return Err(anyhow!("negative i64 where u64 expected: {v}"));
    }
    Ok(v as u64)
}
