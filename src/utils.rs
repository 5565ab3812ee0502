//! Miscellaneous helper utilities.

use crate::errors::Result;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Parse one `(price, volume)` level from its decimal string form.
pub fn parse_level(price: &str, volume: &str) -> Result<(f64, f64)> {
    Ok((price.trim().parse()?, volume.trim().parse()?))
}

/// Parse a list of string levels, failing on the first malformed number.
pub fn parse_levels<'a, I>(levels: I) -> Result<Vec<(f64, f64)>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    levels
        .into_iter()
        .map(|(price, volume)| parse_level(price, volume))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_levels() {
        assert_eq!(parse_level(" 100.5", "2.25 ").unwrap(), (100.5, 2.25));
        assert!(parse_level("bad", "1").is_err());
    }

    #[test]
    fn parse_levels_stops_on_error() {
        let ok = parse_levels([("1", "2"), ("3", "4")]).unwrap();
        assert_eq!(ok, vec![(1.0, 2.0), (3.0, 4.0)]);
        assert!(parse_levels([("1", "2"), ("3", "x")]).is_err());
    }
}
