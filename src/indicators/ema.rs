// =============================================================================
// Exponentially Weighted Moving Average (EWM)
// =============================================================================
//
// Adjusted exponentially weighted mean, parameterised by span:
//
//   alpha  = 2 / (span + 1)
//   y_t    = sum_i w_i * x_{t-i} / sum_i w_i,   w_i = (1 - alpha)^i
//
// Evaluated recursively: the running weight of the history decays by
// (1 - alpha) per row and each new observation enters with weight 1. The first
// output therefore equals the first observation and the average stays a
// continuous function of the whole history.
//
// NaN handling:
//   - leading NaNs produce NaN until the first observation
//   - an interior NaN repeats the previous value, but the history weight
//     still decays for that row
// =============================================================================

/// Smoothing factor for a given span.
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute the EWM series of `values` for `span`.
///
/// The output has the same length as the input.
///
/// # Edge cases
/// - `span == 0` => all NaN (no valid decay factor)
/// - empty input => empty output
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }

    let decay = 1.0 - span_alpha(span);
    let mut out = Vec::with_capacity(values.len());

    let mut weighted = f64::NAN;
    let mut history_weight = 1.0_f64;

    for &x in values {
        let observed = !x.is_nan();
        if weighted.is_nan() {
            if observed {
                weighted = x;
                history_weight = 1.0;
            }
        } else {
            history_weight *= decay;
            if observed {
                if weighted != x {
                    weighted = (history_weight * weighted + x) / (history_weight + 1.0);
                }
                history_weight += 1.0;
            }
        }
        out.push(weighted);
    }

    out
}
