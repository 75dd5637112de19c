//! Binance USD-M Futures market-data provider.
//!
//! Uses the public REST endpoints (no API key):
//! - `/fapi/v1/exchangeInfo` to map venue symbols to base/quote assets
//! - `/fapi/v1/ticker/24hr` for the liquidity snapshot
//! - `/fapi/v1/klines` for candle history
//!
//! Handles rate limiting (429, honouring `Retry-After`), bans (418, never
//! retried) and transient failures with exponential backoff.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::provider::{DataError, MarketDataProvider, Timeframe};
use crate::domain::{display_symbol, unified_symbol, Bar, Ticker};

pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

/// Largest `limit` the klines endpoint accepts.
pub const MAX_KLINES_LIMIT: usize = 1500;

/// Binance error code for an unknown symbol.
const INVALID_SYMBOL_CODE: i64 = -1121;

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    status: String,
    #[serde(default)]
    contract_type: String,
    base_asset: String,
    quote_asset: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    symbol: String,
    #[serde(default)]
    last_price: Option<String>,
    #[serde(default)]
    quote_volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

/// Binance USD-M Futures data provider.
pub struct BinanceFuturesProvider {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl BinanceFuturesProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("crosswatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Override the retry policy.
    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    /// GET a JSON document with retry and backoff.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataError> {
        let url = format!("{}{path}", self.base_url);
        let mut last_error = None;
        let mut retry_after: Option<Duration> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.base_delay * 2u32.pow(attempt - 1);
                let delay = retry_after.take().map_or(backoff, |wait| wait.max(backoff));
                tokio::time::sleep(delay).await;
            }

            let resp = match self.client.get(&url).query(query).send().await {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    tracing::debug!(%url, attempt, error = %e, "request failed, retrying");
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == StatusCode::IM_A_TEAPOT {
                return Err(DataError::Banned);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let secs = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                tracing::warn!(%url, retry_after = secs, attempt, "rate limited by binance");
                retry_after = Some(Duration::from_secs(secs));
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: secs,
                });
                continue;
            }

            if status.is_server_error() {
                let body = resp.text().await.unwrap_or_default();
                tracing::debug!(%url, attempt, status = status.as_u16(), "server error, retrying");
                last_error = Some(DataError::Http {
                    status: status.as_u16(),
                    body,
                });
                continue;
            }

            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(classify_client_error(status.as_u16(), body, query));
            }

            return resp.json::<T>().await.map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse {path}: {e}"))
            });
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// Map a 4xx body onto a typed error.
fn classify_client_error(status: u16, body: String, query: &[(&str, String)]) -> DataError {
    if let Ok(api) = serde_json::from_str::<ApiError>(&body) {
        if api.code == INVALID_SYMBOL_CODE {
            let symbol = query
                .iter()
                .find(|(k, _)| *k == "symbol")
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            return DataError::SymbolNotFound { symbol };
        }
        return DataError::Http {
            status,
            body: format!("{} ({})", api.msg, api.code),
        };
    }
    DataError::Http { status, body }
}

/// Join the 24h snapshot with exchange metadata, keeping snapshot order.
///
/// Only actively trading perpetual contracts survive; identifiers become
/// unified "BASE/QUOTE" form.
fn join_tickers(info: ExchangeInfo, snapshot: Vec<Ticker24h>) -> Vec<Ticker> {
    let assets: HashMap<String, (String, String)> = info
        .symbols
        .into_iter()
        .filter(|s| s.status == "TRADING" && s.contract_type == "PERPETUAL")
        .map(|s| (s.symbol, (s.base_asset, s.quote_asset)))
        .collect();

    snapshot
        .into_iter()
        .filter_map(|t| {
            let (base, quote) = assets.get(&t.symbol)?;
            Some(Ticker::new(
                unified_symbol(base, quote),
                t.last_price.as_deref().and_then(parse_decimal),
                t.quote_volume.as_deref().and_then(parse_decimal),
            ))
        })
        .collect()
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse kline rows: `[openTime, open, high, low, close, volume, closeTime, ...]`.
fn parse_klines(symbol: &str, rows: Vec<Vec<Value>>) -> Result<Vec<Bar>, DataError> {
    let mut bars = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        if row.len() < 6 {
            return Err(DataError::ResponseFormatChanged(format!(
                "{symbol}: kline row {i} has {} fields",
                row.len()
            )));
        }
        let field = |idx: usize, name: &str| {
            number(&row[idx]).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("{symbol}: kline row {i} bad {name}"))
            })
        };

        let open_time = row[0].as_i64().ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("{symbol}: kline row {i} bad open time"))
        })?;
        let timestamp = DateTime::from_timestamp_millis(open_time).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("invalid timestamp: {open_time}"))
        })?;

        bars.push(Bar {
            timestamp,
            open: field(1, "open")?,
            high: field(2, "high")?,
            low: field(3, "low")?,
            close: field(4, "close")?,
            volume: field(5, "volume")?,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

#[async_trait]
impl MarketDataProvider for BinanceFuturesProvider {
    fn name(&self) -> &str {
        "binance_futures"
    }

    async fn fetch_tickers(&self) -> Result<Vec<Ticker>, DataError> {
        let info: ExchangeInfo = self.get_json("/fapi/v1/exchangeInfo", &[]).await?;
        let snapshot: Vec<Ticker24h> = self.get_json("/fapi/v1/ticker/24hr", &[]).await?;
        let tickers = join_tickers(info, snapshot);
        tracing::debug!(count = tickers.len(), "fetched binance ticker snapshot");
        Ok(tickers)
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError> {
        let venue_symbol = display_symbol(symbol);
        let query = [
            ("symbol", venue_symbol),
            ("interval", timeframe.as_str().to_string()),
            ("limit", limit.min(MAX_KLINES_LIMIT).to_string()),
        ];
        let rows: Vec<Vec<Value>> = self.get_json("/fapi/v1/klines", &query).await?;
        if rows.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        parse_klines(symbol, rows)
    }
}
