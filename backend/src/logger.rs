use std::time::Duration;

use tracing::Span;
use tracing::field;

/// Records the parsed request on the current request span.
pub fn annotate_request(tickers: &[String], like: bool) {
    let span = Span::current();
    span.record("tickers", field::debug(tickers));
    span.record("like", like);
}

pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
