//! Crosswatch Runner: scan configuration, orchestration and reporting.
//!
//! This crate builds on `crosswatch-core` to provide:
//! - `ScanConfig` loaded from TOML with validated defaults
//! - `Scanner`, which drives one scan end to end with per-instrument isolation
//! - `ScanReport` summarising skips, signals and delivery outcomes

pub mod config;
pub mod report;
pub mod runner;

pub use config::{BinanceConfig, ConfigError, ScanConfig, TelegramConfig};
pub use report::{DeliveryOutcome, ScanReport, SkippedInstrument};
pub use runner::{InstrumentError, RunError, Scanner};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn scanner_is_send_sync() {
        assert_send::<Scanner>();
        assert_sync::<Scanner>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<ScanReport>();
        assert_sync::<ScanReport>();
        assert_send::<DeliveryOutcome>();
        assert_sync::<DeliveryOutcome>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<InstrumentError>();
        assert_sync::<InstrumentError>();
    }
}
