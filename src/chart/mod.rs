// =============================================================================
// Chart Module
// =============================================================================
//
// Orchestration around the indicator pipeline: ticker parsing, per-symbol
// batch charting, the overlay plan handed to the renderer and the artifacts
// written for it.

pub mod artifact;
pub mod batch;
pub mod plan;

pub use artifact::{list_charts, ChartArtifact};
pub use batch::{chart_batch, chart_symbol, ChartOutcome};
pub use plan::ChartPlan;

use tracing::warn;

/// Whether `ticker` is a plain market symbol: uppercase ASCII letters, digits
/// and `. ^ = -`, with at least one letter or digit.
///
/// Tickers end up in file names and request URLs, so anything else
/// (separators, `..`, lowercase, spaces) is refused.
pub fn is_valid_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-'))
        && ticker.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Split a free-form ticker list on commas and whitespace.
///
/// Tickers are uppercased and de-duplicated keeping the first occurrence;
/// malformed ones are dropped with a warning. At most `max` are returned.
pub fn parse_tickers(input: &str, max: usize) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for raw in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if tickers.len() >= max {
            break;
        }
        if raw.is_empty() {
            continue;
        }
        let ticker = raw.to_uppercase();
        if !is_valid_ticker(&ticker) {
            warn!(ticker = %raw, "ignoring malformed ticker");
            continue;
        }
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}
