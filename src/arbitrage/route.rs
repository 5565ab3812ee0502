//! Multi-leg route simulation.
//!
//! A route threads a holding through successive trades. Each leg either buys
//! the pair's base with the quote asset held, or sells the base held for the
//! quote asset. Moving between exchanges applies the venues' transfer fees.

use super::trade::Trade;
use crate::cex::{Exchange, same_exchange};
use crate::errors::{AppError, Result};
use crate::models::{Asset, OrderBook, Pair, PreparedOrderBook, Side};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RouteLeg {
    pub pair: Pair,
    pub book: Arc<PreparedOrderBook>,
    pub exchange: Arc<dyn Exchange>,
}

#[derive(Debug, Clone, Default)]
pub struct Route {
    pub legs: Vec<RouteLeg>,
}

/// One order a downstream executor would place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    pub pair: Pair,
    pub volume: f64,
    pub side: Side,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    pub amount: f64,
    pub asset: &'static Asset,
    /// Human-readable trace, one step per line.
    pub description: String,
    pub requests: Vec<RouteRequest>,
}

impl Route {
    pub fn new(legs: Vec<RouteLeg>) -> Self {
        Self { legs }
    }

    /// Build a route from fetched books, one `(exchange slug, pair code)` per hop.
    pub fn from_books(books: &[OrderBook], hops: &[(String, String)]) -> Result<Self> {
        let legs = hops
            .iter()
            .map(|(slug, code)| {
                let ob = books
                    .iter()
                    .find(|ob| ob.exchange.meta().slug == slug.as_str() && ob.pair.code == *code)
                    .ok_or_else(|| AppError::MissingOrderBook {
                        exchange: slug.clone(),
                        pair: code.clone(),
                    })?;
                Ok(RouteLeg {
                    pair: ob.pair.clone(),
                    book: Arc::new(ob.prepare()),
                    exchange: Arc::clone(&ob.exchange),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { legs })
    }

    /// Convert `amount` of `asset` through every leg in order.
    pub fn simulate(&self, asset: &'static Asset, amount: f64) -> Result<RouteResult> {
        if self.legs.is_empty() {
            return Err(AppError::EmptyRoute);
        }

        let mut asset = asset;
        let mut amount = amount;
        let mut lines: Vec<String> = Vec::new();
        let mut requests = Vec::with_capacity(self.legs.len());

        for (i, leg) in self.legs.iter().enumerate() {
            let pair = &leg.pair;
            let side = if asset == pair.quote {
                Side::Buy
            } else if asset == pair.base {
                Side::Sell
            } else {
                return Err(AppError::InvalidAsset {
                    asset: asset.slug.to_string(),
                    base: pair.base.slug.to_string(),
                    quote: pair.quote.slug.to_string(),
                });
            };

            // When buying, the holding is quote currency.
            let res = Trade::new(&leg.book, amount, side)
                .quote(side == Side::Buy)
                .pair(pair)
                .simulate()?;
            let received = res.asset.unwrap_or(pair.base);
            let venue = leg.exchange.meta().slug;

            let volume = match side {
                Side::Buy => {
                    lines.push(format!(
                        "TRADE: buy {:.4} {} on {} for {:.4} {} ({:.4} fee)",
                        res.gross, received, venue, amount, asset, res.fee
                    ));
                    res.gross
                }
                Side::Sell => {
                    lines.push(format!(
                        "TRADE: sell {:.4} {} on {} for {:.4} {} ({:.4} fee)",
                        amount, asset, venue, res.gross, received, res.fee
                    ));
                    amount
                }
            };
            requests.push(RouteRequest {
                pair: pair.clone(),
                volume,
                side,
            });
            debug!(leg = i, venue, pair = %pair.code, %side, volume, net = res.net, "[ROUTE] leg simulated");

            amount = res.net;
            asset = received;
            lines.push(format!("HOLDING: {amount:.4} {asset}"));

            match self.legs.get(i + 1) {
                Some(next) if !same_exchange(leg.exchange.as_ref(), next.exchange.as_ref()) => {
                    amount = transfer(leg, next, asset, amount, &mut lines);
                }
                Some(_) => {}
                None => lines.push("DONE".to_string()),
            }
        }

        let mut description = String::new();
        for line in &lines {
            let _ = writeln!(description, "{line}");
        }

        Ok(RouteResult {
            amount,
            asset,
            description,
            requests,
        })
    }
}

/// Move a holding from `from`'s exchange to `to`'s exchange.
fn transfer(
    from: &RouteLeg,
    to: &RouteLeg,
    asset: &Asset,
    amount: f64,
    lines: &mut Vec<String>,
) -> f64 {
    let from_venue = from.exchange.meta().slug;
    let to_venue = to.exchange.meta().slug;
    let withdrawal_fee = from.exchange.withdrawal_fee(asset, amount);
    let deposit_fee = to.exchange.deposit_fee(asset, amount - withdrawal_fee);

    lines.push(format!(
        "FEE: {withdrawal_fee:.4} {asset} withdrawal fee at {from_venue}"
    ));
    lines.push(format!("FEE: {deposit_fee:.4} {asset} deposit fee at {to_venue}"));

    let amount = amount - withdrawal_fee - deposit_fee;
    lines.push(format!("HOLDING: {amount:.4} {asset}"));
    amount
}
