// =============================================================================
// Relative Strength Index (RSI) — bounded incremental recurrence
// =============================================================================
//
// Step 1 — Period-over-period differences of the input price. The first
//          difference is missing.
// Step 2 — Gains are the positive differences, everything else floors to 0.
//          Losses are the negated negative differences, everything else
//          floors to LOSS_FLOOR so the ratio below never divides by zero.
// Step 3 — Seed at index `n`: plain means of the first `n` gains / losses.
//          Every index before `n` is undefined (NaN).
// Step 4 — Wilder-style smoothing for i > n:
//            avg_gain[i] = gain[i] / n + avg_gain[i-1] * (n - 1) / n
//            avg_loss[i] = loss[i] / n + avg_loss[i-1] * (n - 1) / n
// Step 5 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)       (minus 50 when centered)
// Step 6 — Signal line: EWM of the RSI over `avg_period`, with constant
//          +/- band_width bands.
//
// Each smoothed value depends on the previous one, so Step 4 runs as an
// explicit ascending-index loop.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};
use crate::indicators::ema::ewm_mean;
use crate::types::RsiScale;

/// Floor applied to losses so `avg_loss` is always strictly positive.
pub const LOSS_FLOOR: f64 = 1e-10;

/// RSI lookback, smoothing and presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    pub period: usize,
    pub avg_period: usize,
    pub band_width: f64,
    pub scale: RsiScale,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 150,
            avg_period: 30,
            band_width: 0.5,
            scale: RsiScale::Plain,
        }
    }
}

/// Column-wise RSI output, aligned with the input prices.
#[derive(Debug, Clone, PartialEq)]
pub struct RsiSeries {
    pub avg_gain: Vec<f64>,
    pub avg_loss: Vec<f64>,
    pub rsi: Vec<f64>,
    pub rsi_avg: Vec<f64>,
    pub rsi_u: Vec<f64>,
    pub rsi_d: Vec<f64>,
}

/// Compute the RSI columns for `prices`.
///
/// # Errors
/// - `InvalidParameter` when `period` or `avg_period` is zero.
/// - `InsufficientHistory` when there are fewer prices than `period`.
///
/// Exactly `period` prices is accepted; every output is then NaN because the
/// recurrence never starts.
pub fn calculate_rsi(prices: &[f64], params: &RsiParams) -> Result<RsiSeries> {
    let n = params.period;
    if n == 0 {
        return Err(ChartError::invalid("rsi_period", "must be at least 1"));
    }
    if params.avg_period == 0 {
        return Err(ChartError::invalid("rsi_avg", "must be at least 1"));
    }
    if prices.is_empty() || prices.len() < n {
        return Err(ChartError::InsufficientHistory {
            required: n,
            available: prices.len(),
        });
    }

    let (gains, losses) = floored_moves(prices);

    let avg_gain = wilder_smooth(&gains, n);
    let avg_loss = wilder_smooth(&losses, n);

    let rsi: Vec<f64> = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| rsi_from_averages(g, l, params.scale))
        .collect();

    let rsi_avg = ewm_mean(&rsi, params.avg_period);
    let rsi_u = rsi_avg.iter().map(|v| v + params.band_width).collect();
    let rsi_d = rsi_avg.iter().map(|v| v - params.band_width).collect();

    Ok(RsiSeries {
        avg_gain,
        avg_loss,
        rsi,
        rsi_avg,
        rsi_u,
        rsi_d,
    })
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Split price differences into floored gains and losses.
fn floored_moves(prices: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut gains = Vec::with_capacity(prices.len());
    let mut losses = Vec::with_capacity(prices.len());

    for t in 0..prices.len() {
        let diff = if t == 0 {
            f64::NAN
        } else {
            prices[t] - prices[t - 1]
        };
        // NaN comparisons are false, so missing differences take the floor.
        gains.push(if diff > 0.0 { diff } else { 0.0 });
        losses.push(if -diff > 0.0 { -diff } else { LOSS_FLOOR });
    }

    (gains, losses)
}

/// Seeded Wilder smoothing. Indices below `n` are NaN.
fn wilder_smooth(moves: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; moves.len()];
    if moves.len() <= n {
        return out;
    }

    let n_f = n as f64;
    let keep = (n_f - 1.0) / n_f;
    let step = 1.0 / n_f;

    let mut avg = moves[..n].iter().sum::<f64>() / n_f;
    out[n] = avg;

    for i in (n + 1)..moves.len() {
        avg = step * moves[i] + keep * avg;
        out[i] = avg;
    }

    out
}

/// Convert smoothed averages into an RSI value.
///
/// - Undefined averages give NaN (warm-up rows).
/// - No movement above the loss floor gives the neutral midpoint.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64, scale: RsiScale) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        return f64::NAN;
    }
    if avg_gain + avg_loss <= 2.0 * LOSS_FLOOR {
        return scale.midpoint();
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs) - scale.offset()
}
