use super::{Exchange, FetchRequest, Meta, build_url, cell_text, selector};
use crate::assets::{BITCOIN, RAND, RIPPLE};
use crate::errors::Result;
use crate::models::{Pair, RawOrderBook};
use crate::utils::parse_level;
use scraper::Html;
use tracing::debug;

const ALT_URL: &str = "https://www.altcointrader.co.za";

/// AltCoinTrader has no public order book API; the market page is scraped.
#[derive(Debug)]
pub struct AltCoinTrader {
    meta: Meta,
}

impl AltCoinTrader {
    pub fn new() -> Self {
        Self {
            meta: Meta {
                name: "AltCoinTrader",
                slug: "alt",
                api: ALT_URL,
                // Pair codes are page paths.
                pairs: vec![
                    Pair::new(&BITCOIN, &RAND, "/"),
                    Pair::new(&RIPPLE, &RAND, "/xrp"),
                ],
            },
        }
    }

    /// Collect `(price, volume)` rows; rows that do not parse are skipped.
    fn scrape_side(
        &self,
        doc: &Html,
        row_css: &str,
        price_css: &str,
        volume_css: &str,
    ) -> Result<Vec<(f64, f64)>> {
        let slug = self.meta.slug;
        let rows = selector(slug, row_css)?;
        let price = selector(slug, price_css)?;
        let volume = selector(slug, volume_css)?;

        let mut levels = Vec::new();
        for row in doc.select(&rows) {
            let (Some(p), Some(v)) = (cell_text(row, &price), cell_text(row, &volume)) else {
                continue;
            };
            match parse_level(&p, &v) {
                Ok(level) => levels.push(level),
                Err(e) => debug!(error = %e, price = %p, volume = %v, "[CEX] skipping unparsable row"),
            }
        }
        Ok(levels)
    }
}

impl Default for AltCoinTrader {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange for AltCoinTrader {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn order_book_request(&self, pair_code: &str) -> Result<FetchRequest> {
        let url = build_url(self.meta.api, pair_code, &[])?;
        Ok(FetchRequest::get(url).header("Accept", "text/html"))
    }

    fn parse_order_book(&self, _pair_code: &str, body: &[u8]) -> Result<RawOrderBook> {
        let doc = Html::parse_document(&String::from_utf8_lossy(body));
        Ok(RawOrderBook {
            asks: self.scrape_side(&doc, "tr.orderUdSell", ".orderUdSPr", ".orderUdSAm")?,
            bids: self.scrape_side(&doc, "tr.orderUdBuy", ".orderUdBPr", ".orderUdBAm")?,
        })
    }
}
