//! Indicator trait.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! Every output series has the same length as the input; warmup entries are
//! `None`, never a placeholder number.

use crate::domain::Bar;

/// A derived column aligned with its source bars.
pub type Series = Vec<Option<f64>>;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "rsi_14").
    fn name(&self) -> &str;

    /// Index of the first bar that can hold a defined value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a series of the same length as `bars`; the first `lookback()`
    /// entries are `None`.
    fn compute(&self, bars: &[Bar]) -> Series;
}

/// Index of the first defined entry, if any.
pub fn first_defined(series: &[Option<f64>]) -> Option<usize> {
    series.iter().position(Option::is_some)
}
