// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free column computations. Every function takes price
// slices and returns output aligned row-for-row with its input; undefined
// values are NaN. `pipeline` ties them together for a whole QuoteSeries.

pub mod bands;
pub mod ema;
pub mod macd;
pub mod pipeline;
pub mod rsi;

pub use pipeline::{compute_indicators, IndicatorColumns, IndicatorParams, IndicatorRow, IndicatorSeries};
