//! Outcome of one scan: what was analysed, skipped, raised and delivered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crosswatch_core::alert::Recipient;
use crosswatch_core::components::{SignalDirection, SignalEvent};

/// An instrument dropped from this run, with the cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedInstrument {
    pub symbol: String,
    pub reason: String,
}

/// Result of sending one signal to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub symbol: String,
    pub direction: SignalDirection,
    pub recipient: Recipient,
    /// `None` when delivered.
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Selected instruments, in ranking order.
    pub universe: Vec<String>,
    /// Instruments that made it through classification.
    pub analyzed: usize,
    pub skipped: Vec<SkippedInstrument>,
    /// Signals in dispatch order.
    pub signals: Vec<SignalEvent>,
    pub deliveries: Vec<DeliveryOutcome>,
}

impl ScanReport {
    pub fn new(started_at: DateTime<Utc>, universe: Vec<String>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            universe,
            analyzed: 0,
            skipped: Vec::new(),
            signals: Vec::new(),
            deliveries: Vec::new(),
        }
    }

    pub fn delivered_count(&self) -> usize {
        self.deliveries.iter().filter(|d| d.is_delivered()).count()
    }

    pub fn failed_deliveries(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.deliveries.iter().filter(|d| !d.is_delivered())
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "{} instruments, {} analysed, {} skipped, {} signals, {}/{} deliveries ok in {:.1}s",
            self.universe.len(),
            self.analyzed,
            self.skipped.len(),
            self.signals.len(),
            self.delivered_count(),
            self.deliveries.len(),
            (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0,
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
