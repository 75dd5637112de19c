//! Universe selection: the most liquid pairs quoted in one settlement asset.
//!
//! Liquidity is `quote_volume * last_price` from the 24h ticker snapshot.
//! Pairs missing either field, or reporting zero, count as zero liquidity and
//! are dropped even when the floor is zero.

use serde::{Deserialize, Serialize};

use crate::domain::Ticker;

/// Universe selection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseFilter {
    /// Settlement asset the pair must be quoted in.
    pub quote_currency: String,
    /// Maximum number of symbols to return.
    pub top_n: usize,
    /// Liquidity floor, inclusive.
    pub min_volume_usdt: f64,
}

impl Default for UniverseFilter {
    fn default() -> Self {
        Self {
            quote_currency: "USDT".into(),
            top_n: 200,
            min_volume_usdt: 10_000_000.0,
        }
    }
}

impl UniverseFilter {
    /// Apply the filter to a ticker snapshot.
    pub fn select(&self, tickers: &[Ticker]) -> Vec<String> {
        select_universe_in(tickers, &self.quote_currency, self.top_n, self.min_volume_usdt)
    }
}

/// Select the `top_n` most liquid USDT-quoted pairs at or above the floor.
pub fn select_universe(tickers: &[Ticker], top_n: usize, min_volume_usdt: f64) -> Vec<String> {
    select_universe_in(tickers, "USDT", top_n, min_volume_usdt)
}

/// Select the `top_n` most liquid pairs quoted in `quote`, descending by notional.
///
/// Ties keep snapshot order. Returns fewer than `top_n` if fewer qualify.
pub fn select_universe_in(
    tickers: &[Ticker],
    quote: &str,
    top_n: usize,
    min_volume_usdt: f64,
) -> Vec<String> {
    let mut ranked: Vec<(&str, f64)> = tickers
        .iter()
        .filter(|t| t.is_quoted_in(quote))
        .filter_map(|t| {
            let notional = t.notional_volume()?;
            (notional >= min_volume_usdt).then_some((t.symbol.as_str(), notional))
        })
        .collect();

    // sort_by is stable, so equal notionals keep snapshot order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(symbol, _)| symbol.to_string())
        .collect()
}
