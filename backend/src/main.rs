use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;
use stockcheck::{
    config::AppConfig,
    db::Db,
    likes::{Fingerprinter, SqlxLikeRepository},
    pipeline::StockService,
    quote::QuoteClient,
    routes::stock_prices::ClientAddrPolicy,
    server,
};

/// Connects to the like store and ensures its schema (including the unique
/// index on ticker + fingerprint) exists.
async fn init_store(cfg: &AppConfig) -> anyhow::Result<Arc<SqlxLikeRepository>> {
    let db = Db::connect(&cfg.database_url, cfg.db_max_connections)
        .await
        .context("connect like store")?;
    db.migrate().await.context("migrate like store")?;

    tracing::info!("database connection successful");

    Ok(Arc::new(SqlxLikeRepository::new(db.pool)))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;

    common::logger::init_logger("stockcheck", cfg.is_production);

    tracing::info!("Starting stock price checker...");

    let fingerprinter = Fingerprinter::from_salt(&cfg.hash_salt).context("HASH_SALT")?;
    let quotes = Arc::new(QuoteClient::new(&cfg.quote_api_url, cfg.quote_api_timeout)?);
    let likes = init_store(&cfg).await?;

    let service = StockService::new(quotes, likes, fingerprinter);

    let listener = TcpListener::bind((cfg.bind_addr.as_str(), cfg.port))
        .with_context(|| format!("bind {}:{}", cfg.bind_addr, cfg.port))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    server::run(
        listener,
        service,
        ClientAddrPolicy {
            trust_proxy: cfg.trust_proxy,
        },
    )?
    .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}
