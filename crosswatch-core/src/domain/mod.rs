//! Domain types for Crosswatch

pub mod bar;
pub mod instrument;

pub use bar::Bar;
pub use instrument::{display_symbol, quote_asset, unified_symbol, Ticker};
