// =============================================================================
// Batch charting — fetch, compute, slice and write per symbol
// =============================================================================
//
// Every symbol is independent: a failure (unknown ticker, short history, I/O)
// is recorded in that symbol's outcome and the rest of the batch continues.
// At most `max_concurrent_fetches` symbols are in flight at once; outcomes
// come back in input order.
// =============================================================================

use std::path::PathBuf;

use futures_util::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use crate::chart::artifact::ChartArtifact;
use crate::chart::is_valid_ticker;
use crate::chart::plan::ChartPlan;
use crate::error::{ChartError, Result};
use crate::indicators::compute_indicators;
use crate::market_data::{QuoteCache, QuoteProvider};
use crate::runtime_config::ChartConfig;

/// Result of charting one symbol.
#[derive(Debug)]
pub struct ChartOutcome {
    pub symbol: String,
    pub result: Result<PathBuf>,
}

impl ChartOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Chart a single symbol and return the artifact path.
///
/// Indicators are computed on the whole fetched window and sliced to
/// `num_days_plot` afterwards.
#[instrument(skip(cache, config))]
pub async fn chart_symbol<P: QuoteProvider>(
    cache: &QuoteCache<P>,
    config: &ChartConfig,
    symbol: &str,
) -> Result<PathBuf> {
    if !is_valid_ticker(symbol) {
        return Err(ChartError::invalid("symbol", format!("malformed ticker {symbol:?}")));
    }
    let quotes = cache
        .get_quotes(symbol, config.num_days_quote, config.use_cache)
        .await?;

    let full = compute_indicators(&quotes, &config.indicators)?;
    let window = full.tail(config.num_days_plot);

    let plan = ChartPlan::for_symbol(symbol, &config.indicators, config.show_macd);
    ChartArtifact::new(symbol, plan, &window).write(&config.chart_root_path())
}

/// Chart up to `max_num_tickers` symbols with bounded concurrency.
pub async fn chart_batch<P: QuoteProvider>(
    cache: &QuoteCache<P>,
    config: &ChartConfig,
    symbols: &[String],
) -> Vec<ChartOutcome> {
    let limit = config.max_concurrent_fetches.max(1);
    let selected = &symbols[..symbols.len().min(config.max_num_tickers)];
    if selected.len() < symbols.len() {
        warn!(
            requested = symbols.len(),
            max = config.max_num_tickers,
            "ticker list truncated"
        );
    }

    let outcomes: Vec<ChartOutcome> = stream::iter(selected)
        .map(|symbol| async move {
            let result = chart_symbol(cache, config, symbol).await;
            if let Err(e) = &result {
                warn!(symbol = %symbol, error = %e, "chart failed");
            }
            ChartOutcome {
                symbol: symbol.clone(),
                result,
            }
        })
        .buffered(limit)
        .collect()
        .await;

    let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
    info!(
        total = outcomes.len(),
        succeeded,
        failed = outcomes.len() - succeeded,
        "chart batch finished"
    );
    outcomes
}
