//! Trade and route simulation over prepared order books.

pub mod ladder;
pub mod route;
pub mod trade;

pub use ladder::{prepare, prepare_entries};
pub use route::{Route, RouteLeg, RouteRequest, RouteResult};
pub use trade::{Trade, TradeResult};
