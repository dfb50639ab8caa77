use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use stockcheck::error::AppError;
use stockcheck::likes::aggregator::{StockData, StockResult};
use stockcheck::likes::{Fingerprinter, LikeOutcome, LikeRecorder, LikeRepository};
use stockcheck::pipeline::{StockQuery, StockService};
use stockcheck::quote::{Quote, QuoteError};

use mock_quotes::StaticQuotes;
use mock_store::{FailingLikeRepository, InMemoryLikeRepository};

const SALT: &str = "$2b$04$abcdefghijklmnopqrstuu";

const ORIGIN_X: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 10));
const ORIGIN_Y: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 11));

fn service(repo: Arc<dyn LikeRepository>) -> StockService {
    let quotes = Arc::new(StaticQuotes::new(&[
        ("GOOG", 171.5),
        ("MSFT", 412.25),
        ("AAPL", 228.0),
    ]));
    StockService::new(quotes, repo, Fingerprinter::from_salt(SALT).unwrap())
}

fn query(qs: &str) -> StockQuery {
    StockQuery::from_query_string(qs).unwrap()
}

fn single(data: StockData) -> StockResult {
    match data {
        StockData::Single(r) => r,
        other => panic!("expected a single result, got {other:?}"),
    }
}

fn pair(data: StockData) -> [StockResult; 2] {
    match data {
        StockData::Pair(p) => p,
        other => panic!("expected a pair, got {other:?}"),
    }
}

#[tokio::test]
async fn single_ticker_reports_store_count_without_rel_likes() {
    let repo = Arc::new(InMemoryLikeRepository::default());
    repo.seed("GOOG", "someone").await;
    repo.seed("GOOG", "someone-else").await;
    let svc = service(repo.clone());

    let r = single(svc.handle(&query("stock=GOOG"), Some(ORIGIN_X)).await.unwrap());

    assert_eq!(r.stock, "GOOG");
    assert_eq!(r.price, 171.5);
    assert_eq!(r.likes, 2);
    assert_eq!(r.rel_likes, None);
    assert_eq!(repo.insert_attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn liking_twice_from_same_origin_counts_once() {
    let repo = Arc::new(InMemoryLikeRepository::default());
    let svc = service(repo.clone());

    let first = single(svc.handle(&query("stock=GOOG&like=true"), Some(ORIGIN_X)).await.unwrap());
    let second = single(svc.handle(&query("stock=GOOG&like=true"), Some(ORIGIN_X)).await.unwrap());

    assert_eq!(first.likes, 1);
    assert_eq!(second.likes, 1);

    let third = single(svc.handle(&query("stock=GOOG&like=true"), Some(ORIGIN_Y)).await.unwrap());
    assert_eq!(third.likes, 2);
}

#[tokio::test]
async fn liked_once_then_queried_without_like_from_any_origin() {
    let repo = Arc::new(InMemoryLikeRepository::default());
    let svc = service(repo);

    svc.handle(&query("stock=GOOG&like=true"), Some(ORIGIN_X))
        .await
        .unwrap();

    let r = single(svc.handle(&query("stock=GOOG"), Some(ORIGIN_Y)).await.unwrap());
    assert_eq!(r.likes, 1);

    // The origin is irrelevant when not liking.
    let r = single(svc.handle(&query("stock=GOOG"), None).await.unwrap());
    assert_eq!(r.likes, 1);
}

#[tokio::test]
async fn two_tickers_get_relative_likes() {
    let repo = Arc::new(InMemoryLikeRepository::default());
    let svc = service(repo);

    svc.handle(&query("stock=GOOG&like=true"), Some(ORIGIN_X))
        .await
        .unwrap();

    let [goog, msft] = pair(
        svc.handle(&query("stock=GOOG&stock=MSFT"), Some(ORIGIN_X))
            .await
            .unwrap(),
    );

    assert_eq!((goog.stock.as_str(), goog.likes, goog.rel_likes), ("GOOG", 1, Some(1)));
    assert_eq!((msft.stock.as_str(), msft.likes, msft.rel_likes), ("MSFT", 0, Some(-1)));
}

#[tokio::test]
async fn liking_two_tickers_records_both_and_ties_at_zero() {
    let repo = Arc::new(InMemoryLikeRepository::default());
    let svc = service(repo);

    let [goog, msft] = pair(
        svc.handle(&query("stock=GOOG&stock=MSFT&like=true"), Some(ORIGIN_X))
            .await
            .unwrap(),
    );

    assert_eq!((goog.likes, goog.rel_likes), (1, Some(0)));
    assert_eq!((msft.likes, msft.rel_likes), (1, Some(0)));
}

#[tokio::test]
async fn unknown_symbol_aborts_before_any_like_is_recorded() {
    let repo = Arc::new(InMemoryLikeRepository::default());
    let svc = service(repo.clone());

    let err = svc
        .handle(&query("stock=GOOG&stock=1234&like=true"), Some(ORIGIN_X))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Quote(QuoteError::UnknownSymbol(ref t)) if t == "1234"));
    assert!(err.is_user_facing());
    assert_eq!(repo.insert_attempts.load(Ordering::SeqCst), 0);
    assert_eq!(repo.count_by_ticker("GOOG").await.unwrap(), 0);
}

#[tokio::test]
async fn extra_tickers_are_ignored() {
    let repo = Arc::new(InMemoryLikeRepository::default());
    let quotes = Arc::new(StaticQuotes::new(&[("GOOG", 1.0), ("MSFT", 2.0), ("AAPL", 3.0)]));
    let svc = StockService::new(
        quotes.clone(),
        repo.clone(),
        Fingerprinter::from_salt(SALT).unwrap(),
    );

    let [a, b] = pair(
        svc.handle(&query("stock=GOOG&stock=MSFT&stock=AAPL&like=true"), Some(ORIGIN_X))
            .await
            .unwrap(),
    );

    assert_eq!((a.stock.as_str(), b.stock.as_str()), ("GOOG", "MSFT"));
    assert_eq!(quotes.calls.load(Ordering::SeqCst), 2);
    assert_eq!(repo.count_by_ticker("AAPL").await.unwrap(), 0);
}

#[tokio::test]
async fn concurrent_identical_likes_are_deduplicated_by_the_store() {
    // Both requests pass the existence check before either inserts.
    let repo = Arc::new(InMemoryLikeRepository::gated(2));
    let svc = Arc::new(service(repo.clone()));

    let q = query("stock=GOOG&like=true");
    let (a, b) = tokio::join!(svc.handle(&q, Some(ORIGIN_X)), svc.handle(&q, Some(ORIGIN_X)));

    assert_eq!(single(a.unwrap()).likes, 1);
    assert_eq!(single(b.unwrap()).likes, 1);
    assert_eq!(repo.insert_attempts.load(Ordering::SeqCst), 2);
    assert_eq!(repo.count_by_ticker("GOOG").await.unwrap(), 1);
}

#[tokio::test]
async fn tickers_of_one_request_are_recorded_concurrently() {
    // Each ticker's existence check waits for the other's, so a recorder that
    // handles tickers one after another never gets past the first.
    let repo = Arc::new(InMemoryLikeRepository::gated(2));
    let recorder = LikeRecorder::new(repo.clone(), Fingerprinter::from_salt(SALT).unwrap());
    let quotes = [
        Quote { symbol: "GOOG".into(), price: 171.5 },
        Quote { symbol: "MSFT".into(), price: 412.25 },
    ];

    let outcomes = tokio::time::timeout(Duration::from_secs(5), recorder.record(&quotes, ORIGIN_X))
        .await
        .expect("per-ticker like checks did not overlap")
        .unwrap();

    assert_eq!(outcomes, vec![LikeOutcome::Recorded, LikeOutcome::Recorded]);
    assert_eq!(repo.count_by_ticker("GOOG").await.unwrap(), 1);
    assert_eq!(repo.count_by_ticker("MSFT").await.unwrap(), 1);
}

#[tokio::test]
async fn like_without_client_address_is_an_internal_fault() {
    let svc = service(Arc::new(InMemoryLikeRepository::default()));

    let err = svc
        .handle(&query("stock=GOOG&like=true"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MissingClientAddr));
    assert!(!err.is_user_facing());
}

#[tokio::test]
async fn store_failures_are_not_user_facing() {
    let svc = service(Arc::new(FailingLikeRepository));

    let err = svc
        .handle(&query("stock=GOOG&like=true"), Some(ORIGIN_X))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    assert!(!err.is_user_facing());

    let err = svc.handle(&query("stock=GOOG"), Some(ORIGIN_X)).await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
}
