// =============================================================================
// Moving Average Convergence-Divergence (MACD)
// =============================================================================
//
//   macd      = EWM(close, fast) - EWM(close, slow)
//   signal    = EWM(macd, signal)
//   histogram = macd - signal
//
// Default spans: 12 / 26 / 9.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::ema::ewm_mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute the MACD line, signal line and histogram for `closes`.
pub fn calculate_macd(closes: &[f64], params: &MacdParams) -> MacdSeries {
    let fast = ewm_mean(closes, params.fast);
    let slow = ewm_mean(closes, params.slow);

    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ewm_mean(&macd, params.signal);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}
