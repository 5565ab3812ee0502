use crate::errors::{AppError, Result};
use crate::models::{Asset, LadderEntry, Pair, PreparedOrderBook, Side};

/// A single-leg fill request against a prepared book.
#[derive(Debug, Clone, Copy)]
pub struct Trade<'a> {
    pub book: &'a PreparedOrderBook,
    pub amount: f64,
    pub side: Side,
    /// `amount` is in quote units (value) rather than base units (volume).
    pub quote: bool,
    /// Supplies the taker fee and the result asset.
    pub pair: Option<&'a Pair>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeResult {
    pub gross: f64,
    pub fee: f64,
    pub net: f64,
    pub gross_unit: f64,
    pub net_unit: f64,
    pub asset: Option<&'static Asset>,
}

impl<'a> Trade<'a> {
    pub fn new(book: &'a PreparedOrderBook, amount: f64, side: Side) -> Self {
        Self {
            book,
            amount,
            side,
            quote: false,
            pair: None,
        }
    }

    pub fn quote(mut self, quote: bool) -> Self {
        self.quote = quote;
        self
    }

    pub fn pair(mut self, pair: &'a Pair) -> Self {
        self.pair = Some(pair);
        self
    }

    /// Walk the ladder from the best level until the running total strictly
    /// exceeds `amount`, interpolating inside that level.
    ///
    /// A level whose running total equals `amount` exactly does not end the
    /// walk; the fill is priced from the next level onwards.
    pub fn simulate(&self) -> Result<TradeResult> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(AppError::InvalidAmount(self.amount));
        }
        let ladder = self.book.ladder(self.side);
        let last = ladder.last().ok_or(AppError::EmptyLadder(self.side))?;

        let gross = self
            .fill(ladder)
            .ok_or_else(|| AppError::InsufficientLiquidity {
                wanted: self.amount,
                total: self.sized(last),
            })?;

        let (fee, asset) = match self.pair {
            Some(pair) => {
                let asset = match self.side {
                    Side::Buy => pair.base,
                    Side::Sell => pair.quote,
                };
                (gross * pair.taker_fee, Some(asset))
            }
            None => (0.0, None),
        };
        let net = gross - fee;

        Ok(TradeResult {
            gross,
            fee,
            net,
            gross_unit: gross / self.amount,
            net_unit: net / self.amount,
            asset,
        })
    }

    /// Running total the target is compared against.
    fn sized(&self, entry: &LadderEntry) -> f64 {
        if self.quote {
            entry.cum_value
        } else {
            entry.cum_volume
        }
    }

    fn fill(&self, ladder: &[LadderEntry]) -> Option<f64> {
        let ix = ladder.iter().position(|e| self.sized(e) > self.amount)?;
        let entry = &ladder[ix];
        let (prev_volume, prev_value) = match ix.checked_sub(1) {
            Some(p) => (ladder[p].cum_volume, ladder[p].cum_value),
            None => (0.0, 0.0),
        };
        Some(if self.quote {
            prev_volume + (self.amount - prev_value) / entry.price
        } else {
            prev_value + (self.amount - prev_volume) * entry.price
        })
    }
}
