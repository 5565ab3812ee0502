use super::{Exchange, FetchRequest, Meta, build_url};
use crate::assets::{BITCOIN, RAND};
use crate::errors::Result;
use crate::models::{Pair, RawOrderBook};
use serde::Deserialize;

const ICE_API: &str = "https://ice3x.com/api/v1/";

#[derive(Debug, Deserialize)]
struct Level {
    price: f64,
    amount: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Entities {
    #[serde(default)]
    bids: Vec<Level>,
    #[serde(default)]
    asks: Vec<Level>,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    entities: Entities,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Body,
}

#[derive(Debug)]
pub struct Ice {
    meta: Meta,
}

impl Ice {
    pub fn new() -> Self {
        Self {
            meta: Meta {
                name: "ICE",
                slug: "ice",
                api: ICE_API,
                // Pair codes are ICE's numeric pair ids.
                pairs: vec![Pair::new(&BITCOIN, &RAND, "3")],
            },
        }
    }
}

impl Default for Ice {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange for Ice {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn order_book_request(&self, pair_code: &str) -> Result<FetchRequest> {
        let url = build_url(self.meta.api, "orderbook/info", &[("pair_id", pair_code)])?;
        Ok(FetchRequest::get(url).header("Accept", "application/json"))
    }

    fn parse_order_book(&self, _pair_code: &str, body: &[u8]) -> Result<RawOrderBook> {
        let env: Envelope = serde_json::from_slice(body)?;
        let side = |levels: Vec<Level>| -> Vec<(f64, f64)> {
            levels.into_iter().map(|l| (l.price, l.amount)).collect()
        };
        let Entities { bids, asks } = env.response.entities;
        Ok(RawOrderBook {
            bids: side(bids),
            asks: side(asks),
        })
    }
}
