use super::{Exchange, FetchRequest, Meta, build_url, selector};
use crate::assets::{EURO, RAND};
use crate::errors::{AppError, Result};
use crate::models::{Pair, RawOrderBook};
use scraper::Html;

const FNB_URL: &str = "https://www.fnb.co.za/";

/// Bank forex desks quote a rate, not a book; each side is one deep level.
const QUOTED_VOLUME: f64 = 9_999_999.0;

/// FNB forex rates, scraped from the public rates table.
#[derive(Debug)]
pub struct Fnb {
    meta: Meta,
}

impl Fnb {
    pub fn new() -> Self {
        Self {
            meta: Meta {
                name: "FNB",
                slug: "fnb",
                api: FNB_URL,
                pairs: vec![Pair::new(&EURO, &RAND, "EURZAR")],
            },
        }
    }
}

impl Default for Fnb {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange for Fnb {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn order_book_request(&self, _pair_code: &str) -> Result<FetchRequest> {
        let url = build_url(
            self.meta.api,
            "Controller",
            &[("nav", "rates.forex.list.ForexRatesList")],
        )?;
        Ok(FetchRequest::get(url).header("Accept", "text/html"))
    }

    fn parse_order_book(&self, _pair_code: &str, body: &[u8]) -> Result<RawOrderBook> {
        let slug = self.meta.slug;
        let doc = Html::parse_document(&String::from_utf8_lossy(body));
        let table = selector(slug, "table")?;
        let tr = selector(slug, "tr")?;
        let td = selector(slug, "td")?;

        // Row 0 is the header; row 1 holds the EUR rate.
        let row = doc
            .select(&table)
            .next()
            .and_then(|t| t.select(&tr).nth(1))
            .ok_or_else(|| AppError::exchange(slug, "rates table not found"))?;
        let cells: Vec<String> = row
            .select(&td)
            .map(|c| c.text().collect::<String>().trim().to_string())
            .collect();
        let (Some(ask), Some(bid)) = (cells.get(2), cells.get(3)) else {
            return Err(AppError::exchange(slug, "rate cells missing"));
        };

        Ok(RawOrderBook {
            asks: vec![(ask.parse()?, QUOTED_VOLUME)],
            bids: vec![(bid.parse()?, QUOTED_VOLUME)],
        })
    }
}
