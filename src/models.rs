//! Shared data structures used throughout the application.

use crate::cex::Exchange;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A tradable asset. Instances are defined once in [`crate::assets`] and
/// shared by reference.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    pub slug: &'static str,
    pub name: &'static str,
    pub code: &'static str,
    pub symbol: &'static str,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug)
    }
}

/// Trading pair as listed on one exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pair {
    pub base: &'static Asset,
    pub quote: &'static Asset,
    /// Exchange-specific pair code, e.g. "XXBTZEUR".
    pub code: String,
    /// Taker fee as a fraction (0.001 = 0.1%).
    pub taker_fee: f64,
    /// Maker fee as a fraction.
    pub maker_fee: f64,
}

impl Pair {
    pub fn new(base: &'static Asset, quote: &'static Asset, code: &str) -> Self {
        Self {
            base,
            quote,
            code: code.to_string(),
            taker_fee: 0.0,
            maker_fee: 0.0,
        }
    }

    pub fn with_fees(mut self, taker_fee: f64, maker_fee: f64) -> Self {
        self.taker_fee = taker_fee;
        self.maker_fee = maker_fee;
        self
    }
}

/// Side of a trade. A buy consumes asks, a sell consumes bids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// Bid/ask ladders as `(price, volume)` levels, best price first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOrderBook {
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
}

/// A raw book tagged with the pair and exchange it was fetched from.
#[derive(Debug, Clone)]
pub struct OrderBook {
    pub depth: RawOrderBook,
    pub pair: Pair,
    pub exchange: Arc<dyn Exchange>,
}

/// One level of a prepared ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderEntry {
    pub price: f64,
    pub volume: f64,
    /// price * volume
    pub value: f64,
    pub cum_volume: f64,
    pub cum_value: f64,
}

/// Ladders augmented with running volume and value totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedOrderBook {
    pub bids: Vec<LadderEntry>,
    pub asks: Vec<LadderEntry>,
}

impl PreparedOrderBook {
    /// The side a trade of `side` walks through.
    pub fn ladder(&self, side: Side) -> &[LadderEntry] {
        match side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        }
    }
}
