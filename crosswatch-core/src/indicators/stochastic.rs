//! Stochastic oscillator (slow %K / %D).
//!
//! raw %K[t] = 100 * (close[t] - LL) / (HH - LL) over the last `k_period` bars,
//! undefined when HH == LL.
//! %K = SMA(raw %K, k_smooth), %D = SMA(%K, d_period).
//!
//! Produces two series, exposed as separate Indicator instances per line.
//! Lookback: %K = k_period + k_smooth - 2, %D = that + d_period - 1.

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

use super::sma::sma_of_series;

/// Which line of the oscillator to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    k_smooth: usize,
    d_period: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn k(k_period: usize, k_smooth: usize, d_period: usize) -> Self {
        Self::new(k_period, k_smooth, d_period, StochasticLine::K)
    }

    pub fn d(k_period: usize, k_smooth: usize, d_period: usize) -> Self {
        Self::new(k_period, k_smooth, d_period, StochasticLine::D)
    }

    fn new(k_period: usize, k_smooth: usize, d_period: usize, line: StochasticLine) -> Self {
        assert!(
            k_period >= 1 && k_smooth >= 1 && d_period >= 1,
            "stochastic periods must be >= 1"
        );
        let tag = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
        };
        Self {
            k_period,
            k_smooth,
            d_period,
            line,
            name: format!("stoch_{tag}_{k_period}_{k_smooth}_{d_period}"),
        }
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.k_period + self.k_smooth - 2;
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k + self.d_period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let (k, d) = stochastic(bars, self.k_period, self.k_smooth, self.d_period);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => d,
        }
    }
}

/// Compute both lines at once. Returns `(%K, %D)`.
pub fn stochastic(
    bars: &[Bar],
    k_period: usize,
    k_smooth: usize,
    d_period: usize,
) -> (Series, Series) {
    let raw = raw_k(bars, k_period);
    let k = sma_of_series(&raw, k_smooth);
    let d = sma_of_series(&k, d_period);
    (k, d)
}

fn raw_k(bars: &[Bar], period: usize) -> Series {
    let n = bars.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &bars[(i + 1 - period)..=i];
        let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let range = highest - lowest;

        // Zero range → undefined, not 0/0
        if !range.is_finite() || range <= 0.0 {
            continue;
        }
        let value = 100.0 * (bars[i].close - lowest) / range;
        if value.is_finite() {
            result[i] = Some(value);
        }
    }

    result
}
