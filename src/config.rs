//! Configuration loader and application settings.

use crate::assets;
use crate::cex::{self, Exchange};
use crate::errors::{AppError, Result};
use crate::models::Asset;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_CONCURRENCY: usize = 8;
const DEFAULT_USER_AGENT: &str = concat!("arbitrage-simulator/", env!("CARGO_PKG_VERSION"));

/// Limits applied to the concurrent fetch of all order books.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-pair request timeout.
    pub timeout: Duration,
    /// Maximum number of fetches in flight at once.
    pub max_concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Adapter slugs to fetch from; empty means every registered adapter.
    pub exchanges: Vec<String>,
    pub fetch: FetchConfig,
    pub user_agent: String,
    /// Route hops as `(exchange slug, pair code)`.
    pub route: Vec<(String, String)>,
    pub start_asset: &'static Asset,
    pub start_amount: f64,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let exchanges: Vec<String> = get("EXCHANGES")
            .map(|v| split_list(&v).map(str::to_lowercase).collect())
            .unwrap_or_default();

        let timeout_secs: u64 = parse_or("FETCH_TIMEOUT_SECS", get("FETCH_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?;
        let max_concurrency: usize = parse_or(
            "FETCH_MAX_CONCURRENCY",
            get("FETCH_MAX_CONCURRENCY"),
            DEFAULT_MAX_CONCURRENCY,
        )?;
        if max_concurrency == 0 {
            return Err(AppError::Config("FETCH_MAX_CONCURRENCY must be at least 1".into()));
        }

        let route = match get("ROUTE") {
            Some(v) => parse_route(&v)?,
            None => Vec::new(),
        };

        let start_code = get("START_ASSET").unwrap_or_else(|| "zar".into());
        let start_asset = assets::by_code(&start_code)
            .ok_or_else(|| AppError::Config(format!("unknown START_ASSET {start_code:?}")))?;
        let start_amount: f64 = parse_or("START_AMOUNT", get("START_AMOUNT"), 1000.0)?;
        if !(start_amount.is_finite() && start_amount > 0.0) {
            return Err(AppError::Config("START_AMOUNT must be a positive number".into()));
        }

        Ok(Self {
            exchanges,
            fetch: FetchConfig {
                timeout: Duration::from_secs(timeout_secs),
                max_concurrency,
            },
            user_agent: get("HTTP_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            route,
            start_asset,
            start_amount,
        })
    }

    /// Resolve the configured adapters.
    pub fn resolve_exchanges(&self) -> Result<Vec<Arc<dyn Exchange>>> {
        if self.exchanges.is_empty() {
            return Ok(cex::all());
        }
        self.exchanges
            .iter()
            .map(|slug| {
                cex::by_slug(slug).ok_or_else(|| AppError::Config(format!("unknown exchange {slug:?}")))
            })
            .collect()
    }
}

fn split_list(v: &str) -> impl Iterator<Item = &str> {
    v.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(v) => v
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has invalid value {v:?}"))),
        None => Ok(default),
    }
}

/// Parse `slug:PAIR,slug:PAIR` into hops.
pub fn parse_route(v: &str) -> Result<Vec<(String, String)>> {
    split_list(v)
        .map(|hop| {
            let (slug, code) = hop
                .split_once(':')
                .ok_or_else(|| AppError::Config(format!("route hop {hop:?} must be exchange:pair")))?;
            let (slug, code) = (slug.trim(), code.trim());
            if slug.is_empty() || code.is_empty() {
                return Err(AppError::Config(format!("route hop {hop:?} must be exchange:pair")));
            }
            Ok((slug.to_lowercase(), code.to_string()))
        })
        .collect()
}
