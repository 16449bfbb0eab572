// =============================================================================
// quote-charts — technical indicators over cached daily quotes
// =============================================================================
//
// Quote retrieval (provider + on-disk cache), the indicator pipeline, and the
// chart artifacts handed to an external renderer.
// =============================================================================

pub mod chart;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod runtime_config;
pub mod types;

pub use error::{ChartError, Result};
pub use indicators::{compute_indicators, IndicatorParams, IndicatorSeries};
pub use market_data::{QuoteCache, QuoteProvider, YahooClient};
pub use runtime_config::ChartConfig;
pub use types::{Bar, QuoteSeries, RsiScale};
