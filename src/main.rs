use anyhow::{Context, Result};
use arbitrage_simulator::{
    aggregator::{Transport, fetch_order_books},
    arbitrage::Route,
    config::AppConfig,
    utils,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let cfg = AppConfig::from_env().context("loading configuration")?;
    let exchanges = cfg.resolve_exchanges()?;
    tracing::info!(
        exchanges = exchanges.len(),
        timeout_secs = cfg.fetch.timeout.as_secs(),
        max_concurrency = cfg.fetch.max_concurrency,
        "[INIT] arbitrage-simulator starting"
    );

    let client = reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .timeout(cfg.fetch.timeout)
        .build()
        .context("building http client")?;
    let transport: Arc<dyn Transport> = Arc::new(client);

    let books = fetch_order_books(transport, &exchanges, &cfg.fetch)
        .await
        .context("fetching order books")?;

    for book in &books {
        tracing::info!(
            exchange = book.exchange.meta().slug,
            pair = %book.pair.code,
            bids = book.depth.bids.len(),
            asks = book.depth.asks.len(),
            best_bid = ?book.depth.bids.first().map(|l| l.0),
            best_ask = ?book.depth.asks.first().map(|l| l.0),
            "[FETCH] book"
        );
    }

    if cfg.route.is_empty() {
        return Ok(());
    }

    let route = Route::from_books(&books, &cfg.route)?;
    let result = route
        .simulate(cfg.start_asset, cfg.start_amount)
        .context("simulating route")?;

    tracing::info!(
        start_amount = cfg.start_amount,
        start_asset = %cfg.start_asset,
        amount = result.amount,
        asset = %result.asset,
        "[ROUTE] simulated"
    );
    println!("{}", result.description.trim_end());
    println!("{}", serde_json::to_string_pretty(&result.requests)?);
    Ok(())
}
