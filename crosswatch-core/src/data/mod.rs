//! Market data: provider boundary, Binance adapter, universe selection.

pub mod binance;
pub mod provider;
pub mod universe;

pub use binance::BinanceFuturesProvider;
pub use provider::{DataError, MarketDataProvider, Timeframe};
pub use universe::{select_universe, select_universe_in, UniverseFilter};
