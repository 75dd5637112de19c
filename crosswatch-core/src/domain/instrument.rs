//! Instrument identifiers and ticker snapshots.

use serde::{Deserialize, Serialize};

/// Separator between base and quote asset in a unified pair identifier.
pub const PAIR_SEPARATOR: char = '/';

/// Separator before the settlement asset in derivatives identifiers ("BTC/USDT:USDT").
pub const SETTLE_SEPARATOR: char = ':';

/// One row of the upstream 24h ticker snapshot.
///
/// `symbol` is the unified pair identifier ("BTC/USDT"). Both numeric fields are
/// optional: venues omit them for halted or freshly listed contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub last_price: Option<f64>,
    pub quote_volume: Option<f64>,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, last_price: Option<f64>, quote_volume: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price,
            quote_volume,
        }
    }

    /// Notional 24h liquidity: `quote_volume * last_price`.
    ///
    /// `None` when either field is missing or zero, or the product is not finite.
    pub fn notional_volume(&self) -> Option<f64> {
        let volume = self.quote_volume.filter(|v| *v > 0.0)?;
        let price = self.last_price.filter(|p| *p > 0.0)?;
        let notional = volume * price;
        notional.is_finite().then_some(notional)
    }

    /// True if this pair is quoted in `quote` (e.g. "USDT").
    pub fn is_quoted_in(&self, quote: &str) -> bool {
        quote_asset(&self.symbol) == Some(quote)
    }
}

/// Quote asset of a unified identifier: "BTC/USDT:USDT" → "USDT".
pub fn quote_asset(symbol: &str) -> Option<&str> {
    let (_, rest) = symbol.split_once(PAIR_SEPARATOR)?;
    let quote = rest.split(SETTLE_SEPARATOR).next()?;
    (!quote.is_empty()).then_some(quote)
}

/// Build a unified identifier from base and quote assets.
pub fn unified_symbol(base: &str, quote: &str) -> String {
    format!("{base}{PAIR_SEPARATOR}{quote}")
}

/// Exchange-native display form: "BTC/USDT" → "BTCUSDT".
///
/// Any settlement suffix is dropped as well.
pub fn display_symbol(symbol: &str) -> String {
    symbol
        .split(SETTLE_SEPARATOR)
        .next()
        .unwrap_or(symbol)
        .replace(PAIR_SEPARATOR, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notional_multiplies_volume_by_price() {
        let t = Ticker::new("BTC/USDT", Some(2.0), Some(5_000_000.0));
        assert_eq!(t.notional_volume(), Some(10_000_000.0));
    }

    #[test]
    fn notional_missing_field_is_none() {
        assert_eq!(Ticker::new("BTC/USDT", None, Some(1.0)).notional_volume(), None);
        assert_eq!(Ticker::new("BTC/USDT", Some(1.0), None).notional_volume(), None);
        assert_eq!(
            Ticker::new("BTC/USDT", Some(f64::NAN), Some(1.0)).notional_volume(),
            None
        );
    }

    #[test]
    fn notional_zero_field_is_none() {
        assert_eq!(Ticker::new("BTC/USDT", Some(0.0), Some(1e9)).notional_volume(), None);
        assert_eq!(Ticker::new("BTC/USDT", Some(1.0), Some(0.0)).notional_volume(), None);
        assert_eq!(Ticker::new("BTC/USDT", Some(-1.0), Some(1e9)).notional_volume(), None);
    }

    #[test]
    fn quote_asset_parsing() {
        assert_eq!(quote_asset("BTC/USDT"), Some("USDT"));
        assert_eq!(quote_asset("ETH/USDC:USDC"), Some("USDC"));
        assert_eq!(quote_asset("BTCUSDT"), None);
        assert_eq!(quote_asset("BTC/"), None);
    }

    #[test]
    fn quoted_in_matches_exact_asset() {
        let t = Ticker::new("BTC/USDT", Some(1.0), Some(1.0));
        assert!(t.is_quoted_in("USDT"));
        assert!(!t.is_quoted_in("USD"));
        assert!(!Ticker::new("BTC/BUSD", None, None).is_quoted_in("USDT"));
    }

    #[test]
    fn display_symbol_strips_separators() {
        assert_eq!(display_symbol("BTC/USDT"), "BTCUSDT");
        assert_eq!(display_symbol("1000PEPE/USDT:USDT"), "1000PEPEUSDT");
        assert_eq!(display_symbol("BTCUSDT"), "BTCUSDT");
    }

    #[test]
    fn unified_symbol_joins_assets() {
        assert_eq!(unified_symbol("SOL", "USDT"), "SOL/USDT");
    }
}
