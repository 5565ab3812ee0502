use super::{Exchange, FetchRequest, Meta, build_url};
use crate::assets::{BITCOIN, ETHER, RAND};
use crate::errors::Result;
use crate::models::{Pair, RawOrderBook};
use crate::utils::parse_levels;
use serde::Deserialize;

const LUNO_API: &str = "https://api.mybitx.com/api/1/";

#[derive(Debug, Deserialize)]
struct Level {
    price: String,
    volume: String,
}

#[derive(Debug, Deserialize)]
struct OrderBookMsg {
    #[serde(default)]
    bids: Vec<Level>,
    #[serde(default)]
    asks: Vec<Level>,
}

#[derive(Debug)]
pub struct Luno {
    meta: Meta,
}

impl Luno {
    pub fn new() -> Self {
        Self {
            meta: Meta {
                name: "Luno",
                slug: "luno",
                api: LUNO_API,
                pairs: vec![
                    Pair::new(&BITCOIN, &RAND, "XBTZAR"),
                    Pair::new(&ETHER, &BITCOIN, "ETHXBT"),
                ],
            },
        }
    }
}

impl Default for Luno {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange for Luno {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn order_book_request(&self, pair_code: &str) -> Result<FetchRequest> {
        let url = build_url(self.meta.api, "orderbook", &[("pair", pair_code)])?;
        Ok(FetchRequest::get(url).header("Accept", "application/json"))
    }

    fn parse_order_book(&self, _pair_code: &str, body: &[u8]) -> Result<RawOrderBook> {
        let msg: OrderBookMsg = serde_json::from_slice(body)?;
        let side = |levels: &[Level]| {
            parse_levels(
                levels
                    .iter()
                    .map(|l| (l.price.as_str(), l.volume.as_str())),
            )
        };
        Ok(RawOrderBook {
            bids: side(&msg.bids)?,
            asks: side(&msg.asks)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_levels() {
        let raw = br#"{
            "timestamp": 1516220000000,
            "bids": [{"volume": "0.10", "price": "150000.00"}, {"volume": "1.5", "price": "149990"}],
            "asks": [{"volume": "0.25", "price": "150100.00"}]
        }"#;
        let book = Luno::new().parse_order_book("XBTZAR", raw).unwrap();
        assert_eq!(book.bids, vec![(150000.0, 0.1), (149990.0, 1.5)]);
        assert_eq!(book.asks, vec![(150100.0, 0.25)]);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let raw = br#"{"bids":[{"volume":"abc","price":"1"}],"asks":[]}"#;
        assert!(Luno::new().parse_order_book("XBTZAR", raw).is_err());
    }

    #[test]
    fn request_carries_pair() {
        let req = Luno::new().order_book_request("ETHXBT").unwrap();
        assert_eq!(req.url.as_str(), "https://api.mybitx.com/api/1/orderbook?pair=ETHXBT");
    }
}
