use crate::models::{LadderEntry, OrderBook, PreparedOrderBook, RawOrderBook};

/// Extend each `(price, volume)` level with its value and running totals.
///
/// Order is preserved; the caller supplies levels best price first.
pub fn prepare_entries(levels: &[(f64, f64)]) -> Vec<LadderEntry> {
    let mut cum_volume = 0.0;
    let mut cum_value = 0.0;
    levels
        .iter()
        .map(|&(price, volume)| {
            let value = price * volume;
            cum_volume += volume;
            cum_value += value;
            LadderEntry {
                price,
                volume,
                value,
                cum_volume,
                cum_value,
            }
        })
        .collect()
}

pub fn prepare(book: &RawOrderBook) -> PreparedOrderBook {
    PreparedOrderBook {
        bids: prepare_entries(&book.bids),
        asks: prepare_entries(&book.asks),
    }
}

impl RawOrderBook {
    pub fn prepare(&self) -> PreparedOrderBook {
        prepare(self)
    }
}

impl OrderBook {
    pub fn prepare(&self) -> PreparedOrderBook {
        prepare(&self.depth)
    }
}
