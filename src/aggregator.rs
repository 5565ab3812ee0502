//! Concurrent order book fetching across exchanges.

use crate::cex::{Exchange, FetchRequest};
use crate::config::FetchConfig;
use crate::errors::{AppError, Result};
use crate::models::{OrderBook, Pair};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Executes adapter-built requests. Shared by every fetch task.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: FetchRequest) -> Result<Vec<u8>>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: FetchRequest) -> Result<Vec<u8>> {
        let mut builder = self.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let resp = builder.send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Fetch a single trading pair on an exchange.
pub async fn fetch_order_book(
    transport: &dyn Transport,
    exchange: Arc<dyn Exchange>,
    pair: Pair,
) -> Result<OrderBook> {
    let request = exchange.order_book_request(&pair.code)?;
    let body = transport.execute(request).await?;
    let depth = exchange.parse_order_book(&pair.code, &body)?;
    Ok(OrderBook {
        depth,
        pair,
        exchange,
    })
}

/// Fetch every pair of every exchange concurrently.
///
/// Returns all books, or the first error seen. On error the remaining fetches
/// are aborted before returning.
pub async fn fetch_order_books(
    transport: Arc<dyn Transport>,
    exchanges: &[Arc<dyn Exchange>],
    config: &FetchConfig,
) -> Result<Vec<OrderBook>> {
    let total: usize = exchanges.iter().map(|e| e.meta().pairs.len()).sum();
    let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for exchange in exchanges {
        for pair in &exchange.meta().pairs {
            let transport = Arc::clone(&transport);
            let exchange = Arc::clone(exchange);
            let pair = pair.clone();
            let permits = Arc::clone(&permits);
            let limit = config.timeout;

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Task(e.to_string()))?;
                let slug = exchange.meta().slug;
                let code = pair.code.clone();
                tokio::time::timeout(limit, fetch_order_book(transport.as_ref(), exchange, pair))
                    .await
                    .map_err(|_| AppError::Timeout {
                        exchange: slug.to_string(),
                        pair: code,
                    })?
            });
        }
    }
    debug!(tasks = total, max_concurrency = config.max_concurrency, "[FETCH] spawned");

    let mut books = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(|e| AppError::Task(e.to_string())).and_then(|r| r) {
            Ok(book) => {
                debug!(
                    exchange = book.exchange.meta().slug,
                    pair = %book.pair.code,
                    bids = book.depth.bids.len(),
                    asks = book.depth.asks.len(),
                    "[FETCH] order book received"
                );
                books.push(book);
            }
            Err(e) => {
                tasks.abort_all();
                warn!(error = %e, in_flight = tasks.len(), "[FETCH] aborting remaining fetches");
                return Err(e);
            }
        }
    }

    info!(books = books.len(), "[FETCH] all order books fetched");
    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cex::{Ice, Luno};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const LUNO_XBTZAR: &str = "https://api.mybitx.com/api/1/orderbook?pair=XBTZAR";
    const LUNO_ETHXBT: &str = "https://api.mybitx.com/api/1/orderbook?pair=ETHXBT";
    const ICE_XBTZAR: &str = "https://ice3x.com/api/v1/orderbook/info?pair_id=3";

    const LUNO_BODY: &str = r#"{"bids":[{"price":"100","volume":"1"}],"asks":[{"price":"101","volume":"2"}]}"#;
    const ICE_BODY: &str =
        r#"{"response":{"entities":{"bids":[{"price":99,"amount":1}],"asks":[{"price":102,"amount":3}]}}}"#;

    enum Reply {
        Body(&'static str),
        Slow(&'static str),
        Fail(&'static str),
        Hang,
    }

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct MockTransport {
        routes: HashMap<&'static str, Reply>,
        started: AtomicUsize,
        dropped: Arc<AtomicUsize>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MockTransport {
        fn route(mut self, url: &'static str, reply: Reply) -> Self {
            self.routes.insert(url, reply);
            self
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: FetchRequest) -> Result<Vec<u8>> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let _guard = DropCounter(Arc::clone(&self.dropped));

            let out = match self.routes.get(request.url.as_str()) {
                Some(Reply::Body(body)) => Ok(body.as_bytes().to_vec()),
                Some(Reply::Slow(body)) => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(body.as_bytes().to_vec())
                }
                Some(Reply::Fail(msg)) => Err(AppError::exchange("mock", *msg)),
                Some(Reply::Hang) => std::future::pending::<Result<Vec<u8>>>().await,
                None => Err(AppError::exchange("mock", format!("no route for {}", request.url))),
            };
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            out
        }
    }

    fn config(timeout_ms: u64, max_concurrency: usize) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_millis(timeout_ms),
            max_concurrency,
        }
    }

    fn exchanges() -> Vec<Arc<dyn Exchange>> {
        vec![Arc::new(Luno::new()), Arc::new(Ice::new())]
    }

    #[tokio::test]
    async fn fetches_every_pair() {
        let transport = MockTransport::default()
            .route(LUNO_XBTZAR, Reply::Body(LUNO_BODY))
            .route(LUNO_ETHXBT, Reply::Body(LUNO_BODY))
            .route(ICE_XBTZAR, Reply::Body(ICE_BODY));

        let books = fetch_order_books(Arc::new(transport), &exchanges(), &config(1_000, 8))
            .await
            .unwrap();
        assert_eq!(books.len(), 3);

        let mut tags: Vec<(&str, &str)> = books
            .iter()
            .map(|b| (b.exchange.meta().slug, b.pair.code.as_str()))
            .collect();
        tags.sort();
        assert_eq!(tags, vec![("ice", "3"), ("luno", "ETHXBT"), ("luno", "XBTZAR")]);

        let ice = books.iter().find(|b| b.exchange.meta().slug == "ice").unwrap();
        assert_eq!(ice.depth.asks, vec![(102.0, 3.0)]);
    }

    #[tokio::test]
    async fn no_exchanges_yields_no_books() {
        let books = fetch_order_books(Arc::new(MockTransport::default()), &[], &config(100, 4))
            .await
            .unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn first_error_wins_and_cancels_siblings() {
        let transport = Arc::new(
            MockTransport::default()
                .route(LUNO_XBTZAR, Reply::Fail("boom"))
                .route(LUNO_ETHXBT, Reply::Hang)
                .route(ICE_XBTZAR, Reply::Hang),
        );

        let res = tokio::time::timeout(
            Duration::from_secs(5),
            fetch_order_books(transport.clone(), &exchanges(), &config(60_000, 8)),
        )
        .await
        .expect("fetch must not deadlock");

        let err = res.unwrap_err();
        assert!(err.to_string().contains("boom"));

        // Give the runtime a chance to drop the aborted tasks. Every request
        // that started has either finished or been cancelled.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let started = transport.started.load(Ordering::SeqCst);
        assert!(started >= 1);
        assert_eq!(transport.dropped.load(Ordering::SeqCst), started);
    }

    #[tokio::test]
    async fn parse_errors_fail_the_batch() {
        let transport = MockTransport::default()
            .route(LUNO_XBTZAR, Reply::Body(LUNO_BODY))
            .route(LUNO_ETHXBT, Reply::Body("not json"))
            .route(ICE_XBTZAR, Reply::Body(ICE_BODY));

        let err = fetch_order_books(Arc::new(transport), &exchanges(), &config(1_000, 8))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SerdeJson(_)));
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        let transport = MockTransport::default()
            .route(LUNO_XBTZAR, Reply::Body(LUNO_BODY))
            .route(LUNO_ETHXBT, Reply::Body(LUNO_BODY))
            .route(ICE_XBTZAR, Reply::Hang);

        match fetch_order_books(Arc::new(transport), &exchanges(), &config(50, 8)).await {
            Err(AppError::Timeout { exchange, pair }) => {
                assert_eq!(exchange, "ice");
                assert_eq!(pair, "3");
            }
            other => panic!("expected timeout, got {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let transport = Arc::new(
            MockTransport::default()
                .route(LUNO_XBTZAR, Reply::Slow(LUNO_BODY))
                .route(LUNO_ETHXBT, Reply::Slow(LUNO_BODY))
                .route(ICE_XBTZAR, Reply::Slow(ICE_BODY)),
        );

        let books = fetch_order_books(transport.clone(), &exchanges(), &config(1_000, 1))
            .await
            .unwrap();
        assert_eq!(books.len(), 3);
        assert_eq!(transport.peak.load(Ordering::SeqCst), 1);
    }
}
