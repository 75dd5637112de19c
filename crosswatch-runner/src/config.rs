//! Serializable scan configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config.
//! Credentials never live here; the bot token comes from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crosswatch_core::alert::{telegram, Recipient};
use crosswatch_core::data::{binance, Timeframe, UniverseFilter};
use crosswatch_core::frame::IndicatorParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Complete configuration of one scan.
///
/// Table-valued fields come last so the struct serializes to valid TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Chat ids (or channel handles) that receive every alert.
    pub recipients: Vec<Recipient>,

    /// Maximum universe size.
    pub top_n: usize,

    /// Liquidity floor on `quote_volume * last_price`, inclusive.
    pub min_volume_usdt: f64,

    /// Settlement currency of eligible pairs.
    pub quote_currency: String,

    /// Candle interval.
    pub timeframe: Timeframe,

    /// Bars requested per instrument.
    pub history_len: usize,

    /// Venue label shown in alerts.
    pub source_label: String,

    /// Instruments fetched and analysed at once. Dispatch order is unaffected.
    pub analysis_concurrency: usize,

    pub indicators: IndicatorParams,
    pub binance: BinanceConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinanceConfig {
    pub base_url: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: binance::DEFAULT_BASE_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            base_url: telegram::DEFAULT_BASE_URL.into(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        let universe = UniverseFilter::default();
        Self {
            recipients: Vec::new(),
            top_n: universe.top_n,
            min_volume_usdt: universe.min_volume_usdt,
            quote_currency: universe.quote_currency,
            timeframe: Timeframe::H1,
            history_len: 100,
            source_label: "Binance Futures".into(),
            analysis_concurrency: 1,
            indicators: IndicatorParams::default(),
            binance: BinanceConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Universe selection parameters.
    pub fn universe_filter(&self) -> UniverseFilter {
        UniverseFilter {
            quote_currency: self.quote_currency.clone(),
            top_n: self.top_n,
            min_volume_usdt: self.min_volume_usdt,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        let windows = [
            ("indicators.ema_fast", ind.ema_fast),
            ("indicators.ema_slow", ind.ema_slow),
            ("indicators.rsi", ind.rsi),
            ("indicators.stoch_k", ind.stoch_k),
            ("indicators.stoch_k_smooth", ind.stoch_k_smooth),
            ("indicators.stoch_d", ind.stoch_d),
        ];
        for (field, window) in windows {
            if window == 0 {
                return Err(invalid(field, "window must be at least 1"));
            }
        }
        if ind.ema_fast >= ind.ema_slow {
            return Err(invalid(
                "indicators.ema_fast",
                format!("must be below ema_slow ({} >= {})", ind.ema_fast, ind.ema_slow),
            ));
        }
        if self.top_n == 0 {
            return Err(invalid("top_n", "must be at least 1"));
        }
        if self.min_volume_usdt.is_nan() || self.min_volume_usdt < 0.0 {
            return Err(invalid(
                "min_volume_usdt",
                format!("must be a non-negative number, got {}", self.min_volume_usdt),
            ));
        }
        if self.quote_currency.trim().is_empty() {
            return Err(invalid("quote_currency", "must not be empty"));
        }
        if self.history_len <= ind.ema_slow {
            return Err(invalid(
                "history_len",
                format!("must exceed ema_slow ({} <= {})", self.history_len, ind.ema_slow),
            ));
        }
        if self.history_len < ind.min_bars() {
            return Err(invalid(
                "history_len",
                format!("indicators need at least {} bars", ind.min_bars()),
            ));
        }
        if self.history_len > binance::MAX_KLINES_LIMIT {
            return Err(invalid(
                "history_len",
                format!("at most {} bars per request", binance::MAX_KLINES_LIMIT),
            ));
        }
        if self.analysis_concurrency == 0 {
            return Err(invalid("analysis_concurrency", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
