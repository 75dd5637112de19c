//! Scan orchestration.
//!
//! One run: ticker snapshot → universe → per instrument {bars → indicator
//! frame → classifier → alert per recipient}. Only the universe step can fail
//! the run; everything downstream is isolated per instrument or per recipient
//! and recorded in the report.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

use crosswatch_core::alert::{AlertMessage, AlertSink};
use crosswatch_core::components::signal::CrossoverConfirm;
use crosswatch_core::components::{SignalEvent, SignalGenerator};
use crosswatch_core::data::{DataError, MarketDataProvider};
use crosswatch_core::frame::{compute_indicators, ensure_history, FrameError};

use crate::config::{ConfigError, ScanConfig};
use crate::report::{DeliveryOutcome, ScanReport, SkippedInstrument};

/// Why one instrument was dropped from a run.
#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("history fetch failed: {0}")]
    Fetch(#[from] DataError),
    #[error("indicator computation failed: {0}")]
    Frame(#[from] FrameError),
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("universe selection failed: {0}")]
    Universe(#[source] DataError),
}

/// Runs scans against one provider and one alert transport.
pub struct Scanner {
    config: ScanConfig,
    provider: Arc<dyn MarketDataProvider>,
    sink: Arc<dyn AlertSink>,
    generator: CrossoverConfirm,
}

impl Scanner {
    /// Validates `config` before accepting it.
    pub fn new(
        config: ScanConfig,
        provider: Arc<dyn MarketDataProvider>,
        sink: Arc<dyn AlertSink>,
    ) -> Result<Self, RunError> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            sink,
            generator: CrossoverConfirm,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Fetch the ticker snapshot and rank it.
    pub async fn select(&self) -> Result<Vec<String>, RunError> {
        let tickers = self
            .provider
            .fetch_tickers()
            .await
            .map_err(RunError::Universe)?;
        let universe = self.config.universe_filter().select(&tickers);
        tracing::info!(
            provider = self.provider.name(),
            listed = tickers.len(),
            selected = universe.len(),
            "universe selected"
        );
        Ok(universe)
    }

    /// One full scan.
    pub async fn run(&self) -> Result<ScanReport, RunError> {
        let started_at = Utc::now();
        let universe = self.select().await?;
        let mut report = ScanReport::new(started_at, universe.clone());

        // buffered() yields in input order, so dispatch follows the ranking
        let mut analyses = stream::iter(&universe)
            .map(|symbol| async move { (symbol, self.analyze(symbol).await) })
            .buffered(self.config.analysis_concurrency);

        while let Some((symbol, outcome)) = analyses.next().await {
            match outcome {
                Ok(events) => {
                    report.analyzed += 1;
                    for event in events {
                        self.dispatch(&event, &mut report).await;
                        report.signals.push(event);
                    }
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "instrument skipped");
                    report.skipped.push(SkippedInstrument {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.finished_at = Utc::now();
        tracing::info!("scan finished: {}", report.summary());
        Ok(report)
    }

    async fn analyze(&self, symbol: &str) -> Result<Vec<SignalEvent>, InstrumentError> {
        let params = &self.config.indicators;
        let bars = self
            .provider
            .fetch_bars(symbol, self.config.timeframe, self.config.history_len)
            .await?;
        ensure_history(&bars, params)?;
        let frame = compute_indicators(bars, params)?;

        let events = self.generator.classify(symbol, &frame);
        tracing::debug!(symbol, bars = frame.len(), signals = events.len(), "analysed");
        Ok(events)
    }

    /// Send one signal to every recipient; failures are recorded, not raised.
    async fn dispatch(&self, event: &SignalEvent, report: &mut ScanReport) {
        let message = AlertMessage::from_signal(
            event,
            &self.config.source_label,
            self.generator.method(),
            Utc::now(),
        )
        .render();

        tracing::info!(
            symbol = %event.symbol,
            direction = %event.direction,
            price = event.reference_price,
            "signal detected"
        );
        if self.config.recipients.is_empty() {
            tracing::warn!(symbol = %event.symbol, "no recipients configured");
        }

        for recipient in &self.config.recipients {
            let error = match self.sink.deliver(recipient, &message).await {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(
                        symbol = %event.symbol,
                        %recipient,
                        sink = self.sink.name(),
                        error = %e,
                        "delivery failed"
                    );
                    Some(e.to_string())
                }
            };
            report.deliveries.push(DeliveryOutcome {
                symbol: event.symbol.clone(),
                direction: event.direction,
                recipient: recipient.clone(),
                error,
            });
        }
    }
}
