//! Crosswatch Core: domain types, indicators, crossover classifier, data and alert boundaries.
//!
//! This crate contains everything a scan needs except orchestration:
//! - Domain types (bars, tickers, symbol conventions)
//! - EMA, RSI and stochastic indicators with explicit warmup
//! - Indicator frame and the confirmed crossover classifier
//! - Universe selection over a ticker snapshot
//! - Market-data provider trait plus the Binance Futures adapter
//! - Alert payload rendering plus the delivery trait and transports

pub mod alert;
pub mod components;
pub mod data;
pub mod domain;
pub mod frame;
pub mod indicators;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared with the async runner are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Ticker>();
        require_sync::<domain::Ticker>();

        require_send::<frame::IndicatorFrame>();
        require_sync::<frame::IndicatorFrame>();
        require_send::<frame::IndicatorParams>();
        require_sync::<frame::IndicatorParams>();
        require_send::<frame::FrameError>();
        require_sync::<frame::FrameError>();

        require_send::<components::SignalEvent>();
        require_sync::<components::SignalEvent>();
        require_send::<components::signal::CrossoverConfirm>();
        require_sync::<components::signal::CrossoverConfirm>();

        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::BinanceFuturesProvider>();
        require_sync::<data::BinanceFuturesProvider>();

        require_send::<alert::AlertMessage>();
        require_sync::<alert::AlertMessage>();
        require_send::<alert::DeliveryError>();
        require_sync::<alert::DeliveryError>();
        require_send::<alert::TelegramSink>();
        require_sync::<alert::TelegramSink>();
    }

    /// The classifier sees only the indicator frame, never transport state.
    #[test]
    fn signal_generator_is_object_safe() {
        fn _check_trait_object_builds(
            sig: &dyn components::SignalGenerator,
            frame: &frame::IndicatorFrame,
        ) -> Vec<components::SignalDirection> {
            sig.evaluate(frame)
        }
    }
}
