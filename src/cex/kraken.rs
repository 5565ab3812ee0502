use super::{Exchange, FetchRequest, Meta, build_url};
use crate::assets::{BITCOIN, BITCOINCASH, ETHER, EURO, LITECOIN, RIPPLE};
use crate::errors::{AppError, Result};
use crate::models::{Pair, RawOrderBook};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

const KRAKEN_API: &str = "https://api.kraken.com/0/";

#[derive(Debug, Deserialize)]
struct DepthResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: HashMap<String, DepthData>,
}

/// Levels are `[price, volume, timestamp]`; only the first two are used.
#[derive(Debug, Deserialize)]
struct DepthData {
    #[serde(default)]
    bids: Vec<Vec<Value>>,
    #[serde(default)]
    asks: Vec<Vec<Value>>,
}

#[derive(Debug)]
pub struct Kraken {
    meta: Meta,
}

impl Kraken {
    pub fn new() -> Self {
        Self {
            meta: Meta {
                name: "Kraken",
                slug: "kraken",
                api: KRAKEN_API,
                pairs: vec![
                    Pair::new(&BITCOIN, &EURO, "XXBTZEUR"),
                    Pair::new(&RIPPLE, &EURO, "XXRPZEUR"),
                    Pair::new(&RIPPLE, &BITCOIN, "XXRPXXBT"),
                    Pair::new(&LITECOIN, &EURO, "XLTCZEUR"),
                    Pair::new(&LITECOIN, &BITCOIN, "XLTCXXBT"),
                    Pair::new(&BITCOINCASH, &EURO, "BCHEUR"),
                    Pair::new(&BITCOINCASH, &BITCOIN, "BCHXBT"),
                    Pair::new(&ETHER, &EURO, "XETHZEUR"),
                    Pair::new(&ETHER, &BITCOIN, "XETHXXBT"),
                ],
            },
        }
    }

    fn parse_side(&self, levels: &[Vec<Value>]) -> Result<Vec<(f64, f64)>> {
        levels
            .iter()
            .map(|lvl| match (lvl.first(), lvl.get(1)) {
                (Some(price), Some(volume)) => Ok((number(price)?, number(volume)?)),
                _ => Err(AppError::exchange(self.meta.slug, "malformed depth level")),
            })
            .collect()
    }
}

impl Default for Kraken {
    fn default() -> Self {
        Self::new()
    }
}

fn number(v: &Value) -> Result<f64> {
    match v {
        Value::String(s) => Ok(s.trim().parse()?),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| AppError::exchange("kraken", format!("non-finite number {n}"))),
        other => Err(AppError::exchange("kraken", format!("unexpected level value {other}"))),
    }
}

impl Exchange for Kraken {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn order_book_request(&self, pair_code: &str) -> Result<FetchRequest> {
        let url = build_url(self.meta.api, "public/Depth", &[("pair", pair_code)])?;
        Ok(FetchRequest::get(url).header("Accept", "application/json"))
    }

    fn parse_order_book(&self, pair_code: &str, body: &[u8]) -> Result<RawOrderBook> {
        let resp: DepthResponse = serde_json::from_slice(body)?;
        if !resp.error.is_empty() {
            return Err(AppError::exchange(self.meta.slug, resp.error.join(",")));
        }
        let data = resp.result.get(pair_code).ok_or_else(|| {
            AppError::exchange(self.meta.slug, format!("no result for pair {pair_code}"))
        })?;
        Ok(RawOrderBook {
            bids: self.parse_side(&data.bids)?,
            asks: self.parse_side(&data.asks)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_targets_depth_endpoint() {
        let req = Kraken::new().order_book_request("XXBTZEUR").unwrap();
        assert_eq!(
            req.url.as_str(),
            "https://api.kraken.com/0/public/Depth?pair=XXBTZEUR"
        );
    }

    #[test]
    fn parses_keyed_result_for_requested_pair() {
        let raw = br#"{
            "error": [],
            "result": {
                "XXBTZEUR": {
                    "asks": [["9000.1", "0.5", 1516220000], ["9001.0", "1.25", 1516220001]],
                    "bids": [["8999.9", "2.0", 1516220002]]
                },
                "XETHZEUR": {"asks": [["700.0", "1.0", 1]], "bids": []}
            }
        }"#;
        let book = Kraken::new().parse_order_book("XXBTZEUR", raw).unwrap();
        assert_eq!(book.asks, vec![(9000.1, 0.5), (9001.0, 1.25)]);
        assert_eq!(book.bids, vec![(8999.9, 2.0)]);
    }

    #[test]
    fn surfaces_api_errors() {
        let raw = br#"{"error":["EQuery:Unknown asset pair"],"result":{}}"#;
        let err = Kraken::new().parse_order_book("NOPE", raw).unwrap_err();
        assert!(err.to_string().contains("EQuery:Unknown asset pair"));
    }

    #[test]
    fn missing_pair_key_is_an_error() {
        let raw = br#"{"error":[],"result":{"XETHZEUR":{"asks":[],"bids":[]}}}"#;
        let err = Kraken::new().parse_order_book("XXBTZEUR", raw).unwrap_err();
        assert!(matches!(err, AppError::Exchange { .. }));
    }
}
