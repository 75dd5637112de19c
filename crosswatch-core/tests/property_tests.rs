//! Property tests for selection and indicator invariants.
//!
//! Uses proptest to verify:
//! 1. Universe bounds: never more than `top_n`, every pick meets the floor
//! 2. Universe ordering: picks are sorted by notional, descending
//! 3. Warmup: the slow EMA is defined from index 49 onward, the fast from 19
//! 4. No look-ahead: a prefix of the series yields the same indicator values

use chrono::{Duration, TimeZone, Utc};
use crosswatch_core::data::select_universe;
use crosswatch_core::domain::{Bar, Ticker};
use crosswatch_core::frame::{compute_indicators, IndicatorParams};
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

// ── Strategies (proptest) ────────────────────────────────────────────

/// Tickers with unique symbols, mixed quotes and occasionally missing fields.
fn arb_tickers() -> impl Strategy<Value = Vec<Ticker>> {
    let row = (
        prop::sample::select(vec!["USDT", "USDC", "BUSD"]),
        prop::option::weighted(0.9, 0.001..50_000.0_f64),
        prop::option::weighted(0.9, 0.0..1e9_f64),
    );
    prop::collection::vec(row, 0..300).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (quote, price, volume))| {
                Ticker::new(format!("C{i}/{quote}:{quote}"), price, volume)
            })
            .collect()
    })
}

fn arb_closes(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(10.0..1000.0_f64, min_len..200)
}

// ── 1-2. Universe selection ──────────────────────────────────────────

proptest! {
    #[test]
    fn universe_respects_top_n_and_floor(
        tickers in arb_tickers(),
        top_n in 1usize..250,
        floor in 0.0..1e10_f64,
    ) {
        let picked = select_universe(&tickers, top_n, floor);
        prop_assert!(picked.len() <= top_n);

        for symbol in &picked {
            let ticker = tickers.iter().find(|t| &t.symbol == symbol).unwrap();
            prop_assert!(ticker.is_quoted_in("USDT"));
            let notional = ticker.notional_volume().unwrap();
            prop_assert!(notional >= floor);
            prop_assert!(notional > 0.0);
        }
    }

    #[test]
    fn universe_is_sorted_descending(
        tickers in arb_tickers(),
    ) {
        let picked = select_universe(&tickers, 250, 0.0);
        let notionals: Vec<f64> = picked
            .iter()
            .map(|s| tickers.iter().find(|t| &t.symbol == s).unwrap().notional_volume().unwrap())
            .collect();
        for pair in notionals.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }
}

// ── 3. Warmup ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ema_warmup_boundaries(closes in arb_closes(50)) {
        let frame = compute_indicators(bars_from_closes(&closes), &IndicatorParams::default()).unwrap();
        let c = frame.columns();
        for i in 0..closes.len() {
            prop_assert_eq!(c.ema_slow[i].is_some(), i >= 49, "slow EMA at {}", i);
            prop_assert_eq!(c.ema_fast[i].is_some(), i >= 19, "fast EMA at {}", i);
            prop_assert_eq!(c.rsi[i].is_some(), i >= 14, "RSI at {}", i);
        }
    }

    #[test]
    fn rsi_and_stochastic_stay_in_range(closes in arb_closes(20)) {
        let frame = compute_indicators(bars_from_closes(&closes), &IndicatorParams::default()).unwrap();
        let c = frame.columns();
        for v in c.rsi.iter().chain(&c.stoch_k).chain(&c.stoch_d).flatten() {
            prop_assert!((0.0..=100.0).contains(v), "out of range: {}", v);
        }
    }
}

// ── 4. No look-ahead ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn prefix_values_match_full_series(closes in arb_closes(60), cut in 51usize..60) {
        let params = IndicatorParams::default();
        let full = compute_indicators(bars_from_closes(&closes), &params).unwrap();
        let prefix = compute_indicators(bars_from_closes(&closes[..cut]), &params).unwrap();

        let (f, p) = (full.columns(), prefix.columns());
        for i in 0..cut {
            prop_assert_eq!(f.ema_fast[i], p.ema_fast[i]);
            prop_assert_eq!(f.ema_slow[i], p.ema_slow[i]);
            prop_assert_eq!(f.rsi[i], p.rsi[i]);
            prop_assert_eq!(f.stoch_k[i], p.stoch_k[i]);
            prop_assert_eq!(f.stoch_d[i], p.stoch_d[i]);
        }
    }
}
