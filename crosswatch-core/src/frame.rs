//! Indicator frame: a price series plus its derived columns.
//!
//! Built once per instrument per scan, then handed to the classifier and
//! dropped. Every column has the same length as the bar series; entries inside
//! an indicator's warmup window are `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;
use crate::indicators::{Ema, Rsi, Stochastic};

/// Errors raised while turning a bar series into an indicator frame.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("empty price series")]
    EmptySeries,

    #[error("insufficient bars: have {have}, need at least {need}")]
    InsufficientBars { have: usize, need: usize },

    #[error("malformed bar at index {index} ({timestamp})")]
    MalformedBar {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("bar timestamps not strictly ascending at index {index}")]
    NotAscending { index: usize },

    #[error("indicator window {name} must be at least 1")]
    InvalidWindow { name: &'static str },

    #[error("column '{column}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Window lengths for every derived column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi: usize,
    pub stoch_k: usize,
    pub stoch_k_smooth: usize,
    pub stoch_d: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_slow: 50,
            rsi: 14,
            stoch_k: 14,
            stoch_k_smooth: 3,
            stoch_d: 3,
        }
    }
}

impl IndicatorParams {
    /// Reject zero-length windows before any indicator is built.
    pub fn validate(&self) -> Result<(), FrameError> {
        let windows = [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi", self.rsi),
            ("stoch_k", self.stoch_k),
            ("stoch_k_smooth", self.stoch_k_smooth),
            ("stoch_d", self.stoch_d),
        ];
        match windows.into_iter().find(|(_, len)| *len == 0) {
            Some((name, _)) => Err(FrameError::InvalidWindow { name }),
            None => Ok(()),
        }
    }

    /// Index of the first row where every column can be defined.
    pub fn warmup(&self) -> usize {
        // same as the %D lookback, without building the indicator
        let stoch_d = (self.stoch_k + self.stoch_k_smooth)
            .saturating_sub(2)
            .saturating_add(self.stoch_d.saturating_sub(1));
        self.ema_fast
            .saturating_sub(1)
            .max(self.ema_slow.saturating_sub(1))
            .max(self.rsi)
            .max(stoch_d)
    }

    /// Minimum series length that yields two fully-defined rows.
    pub fn min_bars(&self) -> usize {
        self.warmup() + 2
    }
}

/// Derived columns, aligned with the bar series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub ema_fast: Series,
    pub ema_slow: Series,
    pub rsi: Series,
    pub stoch_k: Series,
    pub stoch_d: Series,
}

/// A price series augmented with trend and momentum columns.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    bars: Vec<Bar>,
    columns: Columns,
}

/// One row of the frame; indicator fields are `None` inside warmup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
}

/// A row with every indicator defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefinedRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
}

impl FrameRow {
    /// Returns the row with plain values, or `None` if any indicator is undefined.
    pub fn defined(&self) -> Option<DefinedRow> {
        Some(DefinedRow {
            timestamp: self.timestamp,
            close: self.close,
            ema_fast: self.ema_fast?,
            ema_slow: self.ema_slow?,
            rsi: self.rsi?,
            stoch_k: self.stoch_k?,
            stoch_d: self.stoch_d?,
        })
    }
}

impl IndicatorFrame {
    /// Assemble a frame from precomputed columns.
    pub fn from_columns(bars: Vec<Bar>, columns: Columns) -> Result<Self, FrameError> {
        let expected = bars.len();
        let checks: [(&'static str, usize); 5] = [
            ("ema_fast", columns.ema_fast.len()),
            ("ema_slow", columns.ema_slow.len()),
            ("rsi", columns.rsi.len()),
            ("stoch_k", columns.stoch_k.len()),
            ("stoch_d", columns.stoch_d.len()),
        ];
        for (column, actual) in checks {
            if actual != expected {
                return Err(FrameError::LengthMismatch {
                    column,
                    expected,
                    actual,
                });
            }
        }
        Ok(Self { bars, columns })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn row(&self, index: usize) -> Option<FrameRow> {
        let bar = self.bars.get(index)?;
        let c = &self.columns;
        Some(FrameRow {
            timestamp: bar.timestamp,
            close: bar.close,
            ema_fast: c.ema_fast[index],
            ema_slow: c.ema_slow[index],
            rsi: c.rsi[index],
            stoch_k: c.stoch_k[index],
            stoch_d: c.stoch_d[index],
        })
    }

    /// The last row.
    pub fn latest(&self) -> Option<FrameRow> {
        self.row(self.len().checked_sub(1)?)
    }

    /// The second-to-last row.
    pub fn previous(&self) -> Option<FrameRow> {
        self.row(self.len().checked_sub(2)?)
    }
}

/// Reject series the indicator engine cannot interpret.
pub fn validate_series(bars: &[Bar]) -> Result<(), FrameError> {
    if bars.is_empty() {
        return Err(FrameError::EmptySeries);
    }
    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(FrameError::MalformedBar {
                index,
                timestamp: bar.timestamp,
            });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(FrameError::NotAscending { index });
        }
    }
    Ok(())
}

/// Require enough history for the classifier to see two defined rows.
pub fn ensure_history(bars: &[Bar], params: &IndicatorParams) -> Result<(), FrameError> {
    params.validate()?;
    let need = params.min_bars();
    if bars.len() < need {
        return Err(FrameError::InsufficientBars {
            have: bars.len(),
            need,
        });
    }
    Ok(())
}

/// Compute every derived column for `bars`.
pub fn compute_indicators(
    bars: Vec<Bar>,
    params: &IndicatorParams,
) -> Result<IndicatorFrame, FrameError> {
    params.validate()?;
    validate_series(&bars)?;

    let columns = Columns {
        ema_fast: Ema::new(params.ema_fast).compute(&bars),
        ema_slow: Ema::new(params.ema_slow).compute(&bars),
        rsi: Rsi::new(params.rsi).compute(&bars),
        stoch_k: Stochastic::k(params.stoch_k, params.stoch_k_smooth, params.stoch_d)
            .compute(&bars),
        stoch_d: Stochastic::d(params.stoch_k, params.stoch_k_smooth, params.stoch_d)
            .compute(&bars),
    };

    IndicatorFrame::from_columns(bars, columns)
}
