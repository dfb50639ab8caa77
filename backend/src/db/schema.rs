use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    // Likes: one row per (ticker, fingerprint). The unique index is the only
    // guard against two concurrent requests recording the same like.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS stock_likes (
  stock_ticker TEXT NOT NULL,
  hashed_ip TEXT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_stock_likes_ticker_ip
ON stock_likes(stock_ticker, hashed_ip);
"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
