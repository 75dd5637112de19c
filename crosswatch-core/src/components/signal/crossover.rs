//! Confirmed EMA crossover: trend cross gated by momentum and stochastic.
//!
//! Long: fast EMA crosses above slow EMA between the previous and latest rows,
//! RSI rises, and %K sits above %D on the latest row.
//! Short: the mirror image.

use crate::frame::{DefinedRow, IndicatorFrame};

use super::{SignalDirection, SignalGenerator};

/// Description carried in every alert raised by this generator.
pub const METHOD: &str = "MA Crossover + RSI + Stochastic";

/// EMA crossover with RSI and stochastic confirmation.
///
/// # Indicator dependencies
/// Reads the frame's fast/slow EMA, RSI and stochastic %K/%D columns. Both
/// compared rows must be fully defined, otherwise nothing fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossoverConfirm;

impl CrossoverConfirm {
    fn is_long(prev: &DefinedRow, latest: &DefinedRow) -> bool {
        prev.ema_fast < prev.ema_slow
            && latest.ema_fast > latest.ema_slow
            && latest.rsi > prev.rsi
            && latest.stoch_k > latest.stoch_d
    }

    fn is_short(prev: &DefinedRow, latest: &DefinedRow) -> bool {
        prev.ema_fast > prev.ema_slow
            && latest.ema_fast < latest.ema_slow
            && latest.rsi < prev.rsi
            && latest.stoch_k < latest.stoch_d
    }
}

impl SignalGenerator for CrossoverConfirm {
    fn name(&self) -> &str {
        "ema_cross_rsi_stoch"
    }

    fn method(&self) -> &str {
        METHOD
    }

    fn evaluate(&self, frame: &IndicatorFrame) -> Vec<SignalDirection> {
        let rows = frame
            .previous()
            .and_then(|p| p.defined())
            .zip(frame.latest().and_then(|l| l.defined()));
        let Some((prev, latest)) = rows else {
            return Vec::new();
        };

        let mut signals = Vec::new();
        if Self::is_long(&prev, &latest) {
            signals.push(SignalDirection::Long);
        }
        if Self::is_short(&prev, &latest) {
            signals.push(SignalDirection::Short);
        }
        signals
    }
}

/// Classify the frame's last two rows with the default generator.
pub fn detect_signals(frame: &IndicatorFrame) -> Vec<SignalDirection> {
    CrossoverConfirm.evaluate(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use crate::frame::Columns;
    use chrono::{TimeZone, Utc};

    /// (fast, slow, rsi, k, d) per row
    type Row = (Option<f64>, Option<f64>, Option<f64>, Option<f64>, Option<f64>);

    fn frame(rows: &[Row]) -> IndicatorFrame {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let bars = (0..rows.len())
            .map(|i| Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + i as f64,
                volume: 10.0,
            })
            .collect();
        let columns = Columns {
            ema_fast: rows.iter().map(|r| r.0).collect(),
            ema_slow: rows.iter().map(|r| r.1).collect(),
            rsi: rows.iter().map(|r| r.2).collect(),
            stoch_k: rows.iter().map(|r| r.3).collect(),
            stoch_d: rows.iter().map(|r| r.4).collect(),
        };
        IndicatorFrame::from_columns(bars, columns).unwrap()
    }

    fn row(fast: f64, slow: f64, rsi: f64, k: f64, d: f64) -> Row {
        (Some(fast), Some(slow), Some(rsi), Some(k), Some(d))
    }

    #[test]
    fn bullish_cross_with_confirmation_is_long() {
        let f = frame(&[row(10.0, 11.0, 40.0, 50.0, 50.0), row(12.0, 11.0, 55.0, 70.0, 60.0)]);
        assert_eq!(detect_signals(&f), vec![SignalDirection::Long]);
    }

    #[test]
    fn bearish_cross_with_confirmation_is_short() {
        let f = frame(&[row(12.0, 11.0, 55.0, 50.0, 50.0), row(10.0, 11.0, 40.0, 60.0, 70.0)]);
        assert_eq!(detect_signals(&f), vec![SignalDirection::Short]);
    }

    #[test]
    fn cross_with_flat_momentum_is_silent() {
        let f = frame(&[row(10.0, 11.0, 40.0, 50.0, 50.0), row(12.0, 11.0, 40.0, 70.0, 60.0)]);
        assert!(detect_signals(&f).is_empty());
    }

    #[test]
    fn cross_with_falling_momentum_is_silent() {
        let f = frame(&[row(10.0, 11.0, 40.0, 50.0, 50.0), row(12.0, 11.0, 35.0, 70.0, 60.0)]);
        assert!(detect_signals(&f).is_empty());
    }

    #[test]
    fn cross_without_stochastic_confirmation_is_silent() {
        let f = frame(&[row(10.0, 11.0, 40.0, 50.0, 50.0), row(12.0, 11.0, 55.0, 60.0, 60.0)]);
        assert!(detect_signals(&f).is_empty());
    }

    #[test]
    fn no_cross_is_silent() {
        // Already above on both rows
        let f = frame(&[row(12.0, 11.0, 40.0, 50.0, 50.0), row(13.0, 11.0, 55.0, 70.0, 60.0)]);
        assert!(detect_signals(&f).is_empty());
    }

    #[test]
    fn touching_previous_row_is_not_a_cross() {
        // prev fast == slow: strict inequality required
        let f = frame(&[row(11.0, 11.0, 40.0, 50.0, 50.0), row(12.0, 11.0, 55.0, 70.0, 60.0)]);
        assert!(detect_signals(&f).is_empty());
    }

    #[test]
    fn single_row_yields_nothing() {
        let f = frame(&[row(12.0, 11.0, 55.0, 70.0, 60.0)]);
        assert!(detect_signals(&f).is_empty());
    }

    #[test]
    fn undefined_previous_row_yields_nothing() {
        let f = frame(&[
            (Some(10.0), None, Some(40.0), Some(50.0), Some(50.0)),
            row(12.0, 11.0, 55.0, 70.0, 60.0),
        ]);
        assert!(detect_signals(&f).is_empty());
    }

    #[test]
    fn undefined_latest_stochastic_yields_nothing() {
        let f = frame(&[
            row(10.0, 11.0, 40.0, 50.0, 50.0),
            (Some(12.0), Some(11.0), Some(55.0), Some(70.0), None),
        ]);
        assert!(detect_signals(&f).is_empty());
    }

    #[test]
    fn only_last_two_rows_matter() {
        let f = frame(&[
            row(12.0, 11.0, 80.0, 90.0, 10.0),
            row(10.0, 11.0, 40.0, 50.0, 50.0),
            row(12.0, 11.0, 55.0, 70.0, 60.0),
        ]);
        assert_eq!(detect_signals(&f), vec![SignalDirection::Long]);
    }

    #[test]
    fn classify_stamps_latest_bar() {
        let f = frame(&[row(10.0, 11.0, 40.0, 50.0, 50.0), row(12.0, 11.0, 55.0, 70.0, 60.0)]);
        let events = CrossoverConfirm.classify("BTC/USDT", &f);
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.symbol, "BTC/USDT");
        assert_eq!(e.direction, SignalDirection::Long);
        assert_eq!(e.reference_price, 101.0);
        assert_eq!(e.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap());
    }

    #[test]
    fn generator_metadata() {
        assert_eq!(CrossoverConfirm.name(), "ema_cross_rsi_stoch");
        assert_eq!(CrossoverConfirm.method(), METHOD);
    }
}
