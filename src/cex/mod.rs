//! Centralized exchange adapters.
//!
//! Each exchange describes the pairs it serves, builds a request for one
//! pair's order book, and decodes the response into a [`RawOrderBook`].
//! Adapters never do I/O themselves; the aggregator owns the transport.

use crate::errors::{AppError, Result};
use crate::models::{Asset, Pair, RawOrderBook};
use reqwest::Method;
use scraper::{ElementRef, Selector};
use std::fmt::Debug;
use std::sync::Arc;
use url::Url;

pub mod altcointrader;
pub mod fnb;
pub mod ice;
pub mod kraken;
pub mod luno;

pub use altcointrader::AltCoinTrader;
pub use fnb::Fnb;
pub use ice::Ice;
pub use kraken::Kraken;
pub use luno::Luno;

/// Static identity of an exchange and the pairs it serves.
#[derive(Debug, Clone)]
pub struct Meta {
    pub name: &'static str,
    pub slug: &'static str,
    pub api: &'static str,
    pub pairs: Vec<Pair>,
}

/// Transport-agnostic description of one HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

pub trait Exchange: Debug + Send + Sync {
    fn meta(&self) -> &Meta;

    /// Request for the order book of `pair_code`.
    fn order_book_request(&self, pair_code: &str) -> Result<FetchRequest>;

    /// Decode a response body fetched for `pair_code`.
    fn parse_order_book(&self, pair_code: &str, body: &[u8]) -> Result<RawOrderBook>;

    /// Fee charged when withdrawing `amount` of `asset` from this exchange.
    fn withdrawal_fee(&self, _asset: &Asset, _amount: f64) -> f64 {
        0.0
    }

    /// Fee charged when depositing `amount` of `asset` into this exchange.
    fn deposit_fee(&self, _asset: &Asset, _amount: f64) -> f64 {
        0.0
    }
}

/// Join `path` onto the exchange API base and append query parameters.
pub fn build_url(api: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(api)?;
    let base = url.path().trim_end_matches('/').to_string();
    let tail = path.trim_matches('/');
    let joined = match (base.is_empty(), tail.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => base,
        (_, false) => format!("{base}/{tail}"),
    };
    url.set_path(&joined);
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }
    Ok(url)
}

/// Compile a CSS selector for an HTML-scraping adapter.
pub(crate) fn selector(exchange: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AppError::exchange(exchange, format!("selector {css}: {e}")))
}

/// Trimmed text of the first element under `el` matching `sel`.
pub(crate) fn cell_text(el: ElementRef<'_>, sel: &Selector) -> Option<String> {
    el.select(sel)
        .next()
        .map(|cell| cell.text().collect::<String>().trim().to_string())
}

/// Every registered adapter.
pub fn all() -> Vec<Arc<dyn Exchange>> {
    vec![
        Arc::new(Luno::new()),
        Arc::new(Kraken::new()),
        Arc::new(Ice::new()),
        Arc::new(Fnb::new()),
        Arc::new(AltCoinTrader::new()),
    ]
}

pub fn by_slug(slug: &str) -> Option<Arc<dyn Exchange>> {
    all()
        .into_iter()
        .find(|e| e.meta().slug.eq_ignore_ascii_case(slug.trim()))
}

/// Two adapters are the same venue when their slugs match.
pub fn same_exchange(a: &dyn Exchange, b: &dyn Exchange) -> bool {
    a.meta().slug == b.meta().slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_paths_and_params() {
        let url = build_url("https://api.kraken.com/0/", "public/Depth", &[("pair", "XXBTZEUR")])
            .expect("valid url");
        assert_eq!(url.as_str(), "https://api.kraken.com/0/public/Depth?pair=XXBTZEUR");

        let url = build_url("https://www.altcointrader.co.za", "/", &[]).expect("valid url");
        assert_eq!(url.as_str(), "https://www.altcointrader.co.za/");

        let url = build_url("https://www.altcointrader.co.za", "/xrp", &[]).expect("valid url");
        assert_eq!(url.as_str(), "https://www.altcointrader.co.za/xrp");
    }

    #[test]
    fn build_url_rejects_bad_base() {
        assert!(build_url("not a url", "x", &[]).is_err());
    }

    #[test]
    fn registry_lookup() {
        let slugs: Vec<&str> = all().iter().map(|e| e.meta().slug).collect();
        assert_eq!(slugs, vec!["luno", "kraken", "ice", "fnb", "alt"]);
        assert!(by_slug("KRAKEN").is_some());
        assert!(by_slug("bitstamp").is_none());
    }
}
