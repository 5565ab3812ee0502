use crate::models::Side;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse float error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Exchange error ({exchange}): {message}")]
    Exchange { exchange: String, message: String },

    #[error("Timed out fetching {pair} on {exchange}")]
    Timeout { exchange: String, pair: String },

    #[error("Fetch task failed: {0}")]
    Task(String),

    #[error("Orderbook too small: wanted {wanted:.6}, total {total:.6}")]
    InsufficientLiquidity { wanted: f64, total: f64 },

    #[error("Invalid asset \"{asset}\" for simulation: must be \"{base}\" or \"{quote}\"")]
    InvalidAsset {
        asset: String,
        base: String,
        quote: String,
    },

    #[error("Invalid trade amount: {0}")]
    InvalidAmount(f64),

    #[error("No {0} levels in order book")]
    EmptyLadder(Side),

    #[error("Route has no legs")]
    EmptyRoute,

    #[error("No order book fetched for {pair} on {exchange}")]
    MissingOrderBook { exchange: String, pair: String },
}

impl AppError {
    pub(crate) fn exchange(exchange: &str, message: impl Into<String>) -> Self {
        AppError::Exchange {
            exchange: exchange.to_string(),
            message: message.into(),
        }
    }
}
