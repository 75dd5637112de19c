//! Signal generation: detects market events, emits directional intent.
//!
//! Signals look only at an indicator frame. No state survives between
//! instruments or scans; every event describes the latest closed comparison.

pub mod crossover;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::frame::IndicatorFrame;

/// Directional intent of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalDirection {
    Long,
    Short,
}

impl SignalDirection {
    pub fn label(&self) -> &'static str {
        match self {
            SignalDirection::Long => "LONG",
            SignalDirection::Short => "SHORT",
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SignalDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LONG" => Ok(SignalDirection::Long),
            "SHORT" => Ok(SignalDirection::Short),
            other => Err(format!("unknown signal direction '{other}'")),
        }
    }
}

/// A signal raised on one instrument at the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: String,
    pub direction: SignalDirection,
    /// Close of the bar that completed the crossover.
    pub reference_price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Trait for signal generators.
pub trait SignalGenerator: Send + Sync {
    /// Human-readable name (e.g., "ema_cross_rsi_stoch").
    fn name(&self) -> &str;

    /// Fixed description of the triggering method, shown in alerts.
    fn method(&self) -> &str;

    /// Every direction whose condition holds on the frame's last two rows.
    ///
    /// Conditions are evaluated independently; callers must not assume at most one.
    fn evaluate(&self, frame: &IndicatorFrame) -> Vec<SignalDirection>;

    /// Wrap `evaluate` results into events stamped with the latest bar.
    fn classify(&self, symbol: &str, frame: &IndicatorFrame) -> Vec<SignalEvent> {
        let Some(latest) = frame.latest() else {
            return Vec::new();
        };
        self.evaluate(frame)
            .into_iter()
            .map(|direction| SignalEvent {
                symbol: symbol.to_string(),
                direction,
                reference_price: latest.close,
                timestamp: latest.timestamp,
            })
            .collect()
    }
}

pub use crossover::{detect_signals, CrossoverConfirm};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_labels_round_trip() {
        for d in [SignalDirection::Long, SignalDirection::Short] {
            assert_eq!(d.label().parse::<SignalDirection>().unwrap(), d);
        }
        assert!("long".parse::<SignalDirection>().is_err());
    }

    #[test]
    fn direction_serializes_upper_case() {
        let json = serde_json::to_string(&SignalDirection::Short).unwrap();
        assert_eq!(json, "\"SHORT\"");
    }
}
