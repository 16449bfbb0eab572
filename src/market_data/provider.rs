//! Abstraction over the external market-data source.
//!
//! The cache and the batch charting code only need "daily history for a
//! symbol", so any vendor can sit behind [`QuoteProvider`]. Failures of any
//! kind surface as [`ChartError::DataUnavailable`](crate::error::ChartError).

use async_trait::async_trait;

use crate::error::Result;
use crate::types::QuoteSeries;

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch up to `window_days` calendar days of daily bars, oldest first.
    async fn fetch_daily(&self, symbol: &str, window_days: u32) -> Result<QuoteSeries>;
}

#[async_trait]
impl<P: QuoteProvider + ?Sized> QuoteProvider for std::sync::Arc<P> {
    async fn fetch_daily(&self, symbol: &str, window_days: u32) -> Result<QuoteSeries> {
        (**self).fetch_daily(symbol, window_days).await
    }
}
