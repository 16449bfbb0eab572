// =============================================================================
// Volatility Bands around an EWM
// =============================================================================
//
// The half-width of the band is a smoothed daily range:
//
//   half_band = 0.5 * scale * EWM(high - low, span / 2)
//   upper     = average + half_band
//   lower     = average - half_band
//
// The range span is half the span of the average it wraps (at least 1).
// =============================================================================

use crate::indicators::ema::ewm_mean;

/// A moving average with its volatility band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedAverage {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Span used to smooth the daily range for an average of `span`.
pub fn range_span(span: usize) -> usize {
    (span / 2).max(1)
}

/// EWM of `prices` over `span`, banded by the smoothed `ranges`.
///
/// `prices` and `ranges` must be the same length.
pub fn banded_average(prices: &[f64], ranges: &[f64], span: usize, scale: f64) -> BandedAverage {
    debug_assert_eq!(prices.len(), ranges.len());

    let middle = ewm_mean(prices, span);
    let smoothed_range = ewm_mean(ranges, range_span(span));

    let (upper, lower) = middle
        .iter()
        .zip(&smoothed_range)
        .map(|(m, r)| {
            let half = 0.5 * r * scale;
            (m + half, m - half)
        })
        .unzip();

    BandedAverage {
        middle,
        upper,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_span_halves_and_floors() {
        assert_eq!(range_span(50), 25);
        assert_eq!(range_span(15), 7);
        assert_eq!(range_span(1), 1);
        assert_eq!(range_span(0), 1);
    }

    #[test]
    fn constant_range_gives_constant_width() {
        let prices: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let ranges = vec![2.0; 30];
        let out = banded_average(&prices, &ranges, 10, 2.0);
        for i in 0..30 {
            // half = 0.5 * 2.0 * 2.0 = 2.0
            assert!((out.upper[i] - out.middle[i] - 2.0).abs() < 1e-12);
            assert!((out.middle[i] - out.lower[i] - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_range_collapses_band() {
        let prices = vec![5.0; 10];
        let out = banded_average(&prices, &[0.0; 10], 4, 2.0);
        assert_eq!(out.upper, out.middle);
        assert_eq!(out.lower, out.middle);
    }

    #[test]
    fn scale_widens_band() {
        let prices = vec![5.0; 10];
        let ranges = vec![1.0; 10];
        let narrow = banded_average(&prices, &ranges, 4, 1.0);
        let wide = banded_average(&prices, &ranges, 4, 3.0);
        assert!(wide.upper[9] - wide.lower[9] > narrow.upper[9] - narrow.lower[9]);
    }
}
