//! Alert payloads and delivery boundary.
//!
//! The core builds and renders the message; transports behind `AlertSink`
//! only move text to a recipient.

pub mod log_sink;
pub mod telegram;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::components::signal::{SignalDirection, SignalEvent};
use crate::domain::display_symbol;

pub use log_sink::LogSink;
pub use telegram::TelegramSink;

/// Decimal places for rendered prices.
pub const PRICE_DECIMALS: usize = 4;

/// Rendered timestamp format (always UTC).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M GMT";

const SYMBOL_PREFIX: &str = "🔹 Symbol: ";
const PRICE_PREFIX: &str = "💰 Current Price: $";
const SOURCE_PREFIX: &str = "📊 Exchange: ";
const TIME_PREFIX: &str = "🕓 Time: ";
const METHOD_PREFIX: &str = "📈 Signal Type: ";

/// Characters that open an entity in Telegram's legacy Markdown.
const MARKDOWN_SPECIAL: [char; 4] = ['_', '*', '`', '['];

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unescape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(|n| MARKDOWN_SPECIAL.contains(n)) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Opaque chat destination (numeric chat id or channel handle).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRecipient", into = "RawRecipient")]
pub struct Recipient(String);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawRecipient {
    Id(i64),
    Handle(String),
}

impl From<RawRecipient> for Recipient {
    fn from(raw: RawRecipient) -> Self {
        match raw {
            RawRecipient::Id(id) => Recipient(id.to_string()),
            RawRecipient::Handle(h) => Recipient(h),
        }
    }
}

impl From<Recipient> for RawRecipient {
    fn from(r: Recipient) -> Self {
        match r.0.parse::<i64>() {
            Ok(id) => RawRecipient::Id(id),
            Err(_) => RawRecipient::Handle(r.0),
        }
    }
}

impl Recipient {
    pub fn new(id: impl Into<String>) -> Self {
        Recipient(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for Recipient {
    fn from(id: i64) -> Self {
        Recipient(id.to_string())
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from a delivery transport.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected by messaging API (HTTP {status}): {description}")]
    Rejected { status: u16, description: String },

    #[error("delivery not configured: {0}")]
    NotConfigured(String),
}

/// Errors from parsing a rendered alert back into fields.
#[derive(Debug, Error, PartialEq)]
pub enum AlertParseError {
    #[error("missing line: {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Trait for alert transports.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Human-readable name of this transport.
    fn name(&self) -> &str;

    /// Send one rendered message to one recipient.
    async fn deliver(&self, recipient: &Recipient, message: &str) -> Result<(), DeliveryError>;
}

/// Everything an alert shows, before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub direction: SignalDirection,
    /// Exchange-native symbol, separator removed ("BTCUSDT").
    pub symbol: String,
    pub price: f64,
    /// Venue label, e.g. "Binance Futures".
    pub source: String,
    pub sent_at: DateTime<Utc>,
    /// Description of the triggering method.
    pub method: String,
}

impl AlertMessage {
    pub fn from_signal(
        event: &SignalEvent,
        source: &str,
        method: &str,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            direction: event.direction,
            symbol: display_symbol(&event.symbol),
            price: event.reference_price,
            source: source.to_string(),
            sent_at,
            method: method.to_string(),
        }
    }

    /// Render as Telegram-flavoured markdown.
    ///
    /// Free-text fields are escaped so a stray `_` or `*` cannot break parsing.
    pub fn render(&self) -> String {
        format!(
            "🚨 *{direction} Signal Detected*\n\
             \n\
             {SYMBOL_PREFIX}{symbol}\n\
             {PRICE_PREFIX}{price:.prec$}\n\
             {SOURCE_PREFIX}{source}\n\
             {TIME_PREFIX}{time}\n\
             {METHOD_PREFIX}{method}\n",
            direction = self.direction,
            symbol = escape_markdown(&self.symbol),
            price = self.price,
            prec = PRICE_DECIMALS,
            source = escape_markdown(&self.source),
            time = self.sent_at.format(TIME_FORMAT),
            method = escape_markdown(&self.method),
        )
    }

    /// Recover an alert from its rendered text.
    ///
    /// Price comes back at `PRICE_DECIMALS` precision and the time at minute precision.
    pub fn parse(text: &str) -> Result<Self, AlertParseError> {
        let line = |prefix: &str, field: &'static str| {
            text.lines()
                .find_map(|l| l.trim().strip_prefix(prefix))
                .map(str::trim)
                .ok_or(AlertParseError::MissingField(field))
        };

        let header = text
            .lines()
            .map(str::trim)
            .find(|l| l.ends_with(" Signal Detected*"))
            .ok_or(AlertParseError::MissingField("header"))?;
        let label = header
            .trim_start_matches("🚨")
            .trim()
            .trim_start_matches('*')
            .trim_end_matches(" Signal Detected*");
        let direction = label
            .parse::<SignalDirection>()
            .map_err(|_| AlertParseError::InvalidField {
                field: "direction",
                value: label.to_string(),
            })?;

        let price_text = line(PRICE_PREFIX, "price")?;
        let price = price_text
            .parse::<f64>()
            .map_err(|_| AlertParseError::InvalidField {
                field: "price",
                value: price_text.to_string(),
            })?;

        let time_text = line(TIME_PREFIX, "time")?;
        let sent_at = NaiveDateTime::parse_from_str(time_text, TIME_FORMAT)
            .map_err(|_| AlertParseError::InvalidField {
                field: "time",
                value: time_text.to_string(),
            })?
            .and_utc();

        Ok(Self {
            direction,
            symbol: unescape_markdown(line(SYMBOL_PREFIX, "symbol")?),
            price,
            source: unescape_markdown(line(SOURCE_PREFIX, "source")?),
            sent_at,
            method: unescape_markdown(line(METHOD_PREFIX, "method")?),
        })
    }
}
