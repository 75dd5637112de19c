//! Component traits.
//!
//! - Indicator: bar history in, aligned numeric series out
//! - Signal generator: indicator frame in, directional events out

pub mod indicator;
pub mod signal;

pub use indicator::{Indicator, Series};
pub use signal::{SignalDirection, SignalEvent, SignalGenerator};
