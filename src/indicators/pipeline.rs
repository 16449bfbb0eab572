// =============================================================================
// Indicator Pipeline
// =============================================================================
//
// Turns a QuoteSeries into an IndicatorSeries: the original bars plus derived
// columns, all aligned row-for-row with the bars.
//
//   w_p        weighted price 0.25 * (2*close + high + low)
//   ema_*      EWM of w_p at the fast / slow / long spans, with _u / _d bands
//   vol_avg    EWM of volume / volume_scale
//   macd*      MACD of close
//   rsi*       bounded incremental RSI of w_p, signal line and bands
//
// Indicators must be computed on the full fetched window and only then sliced
// with `IndicatorSeries::tail`; the averages and the RSI recurrence need the
// rows that precede the plotting window.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChartError, Result};
use crate::indicators::bands::banded_average;
use crate::indicators::ema::ewm_mean;
use crate::indicators::macd::{calculate_macd, MacdParams};
use crate::indicators::rsi::{calculate_rsi, RsiParams};
use crate::types::{Bar, QuoteSeries, RsiScale};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_ma_fast() -> usize {
    15
}

fn default_ma_slow() -> usize {
    50
}

fn default_ma_long() -> usize {
    150
}

fn default_band_scale() -> f64 {
    2.0
}

fn default_ma_vol() -> usize {
    20
}

fn default_volume_scale() -> f64 {
    1_000_000.0
}

fn default_rsi_period() -> usize {
    150
}

fn default_rsi_avg() -> usize {
    30
}

fn default_rsi_band_width() -> f64 {
    0.5
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Every tunable of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Span of the fast average of the weighted price.
    #[serde(default = "default_ma_fast")]
    pub ma_fast: usize,

    /// Span of the slow average of the weighted price.
    #[serde(default = "default_ma_slow")]
    pub ma_slow: usize,

    /// Span of the long average of the weighted price.
    #[serde(default = "default_ma_long")]
    pub ma_long: usize,

    /// Multiplier applied to the smoothed daily range for the volatility bands.
    #[serde(default = "default_band_scale")]
    pub band_scale: f64,

    /// Span of the volume average.
    #[serde(default = "default_ma_vol")]
    pub ma_vol: usize,

    /// Volume is divided by this before averaging (display scale).
    #[serde(default = "default_volume_scale")]
    pub volume_scale: f64,

    /// RSI lookback `n`.
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Span of the RSI signal line.
    #[serde(default = "default_rsi_avg")]
    pub rsi_avg: usize,

    /// Constant offset of the RSI bands around the signal line.
    #[serde(default = "default_rsi_band_width")]
    pub rsi_band_width: f64,

    #[serde(default)]
    pub rsi_scale: RsiScale,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ma_fast: default_ma_fast(),
            ma_slow: default_ma_slow(),
            ma_long: default_ma_long(),
            band_scale: default_band_scale(),
            ma_vol: default_ma_vol(),
            volume_scale: default_volume_scale(),
            rsi_period: default_rsi_period(),
            rsi_avg: default_rsi_avg(),
            rsi_band_width: default_rsi_band_width(),
            rsi_scale: RsiScale::default(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
        }
    }
}

impl IndicatorParams {
    pub fn rsi_params(&self) -> RsiParams {
        RsiParams {
            period: self.rsi_period,
            avg_period: self.rsi_avg,
            band_width: self.rsi_band_width,
            scale: self.rsi_scale,
        }
    }

    pub fn macd_params(&self) -> MacdParams {
        MacdParams {
            fast: self.macd_fast,
            slow: self.macd_slow,
            signal: self.macd_signal,
        }
    }

    /// Reject zero spans and non-positive scales.
    pub fn validate(&self) -> Result<()> {
        let spans = [
            ("ma_fast", self.ma_fast),
            ("ma_slow", self.ma_slow),
            ("ma_long", self.ma_long),
            ("ma_vol", self.ma_vol),
            ("rsi_period", self.rsi_period),
            ("rsi_avg", self.rsi_avg),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        for (name, span) in spans {
            if span == 0 {
                return Err(ChartError::invalid(name, "must be at least 1"));
            }
        }
        if !(self.volume_scale.is_finite() && self.volume_scale > 0.0) {
            return Err(ChartError::invalid(
                "volume_scale",
                format!("must be positive, got {}", self.volume_scale),
            ));
        }
        if !self.band_scale.is_finite() || self.band_scale < 0.0 {
            return Err(ChartError::invalid(
                "band_scale",
                format!("must be non-negative, got {}", self.band_scale),
            ));
        }
        if !self.rsi_band_width.is_finite() {
            return Err(ChartError::invalid("rsi_band_width", "must be finite"));
        }
        Ok(())
    }
}

// =============================================================================
// IndicatorSeries
// =============================================================================

/// Derived columns, each aligned with the bars. Undefined values are NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorColumns {
    pub w_p: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_fast_u: Vec<f64>,
    pub ema_fast_d: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub ema_slow_u: Vec<f64>,
    pub ema_slow_d: Vec<f64>,
    pub ema_long: Vec<f64>,
    pub ema_long_u: Vec<f64>,
    pub ema_long_d: Vec<f64>,
    pub vol_avg: Vec<f64>,
    pub rsi_avg_gain: Vec<f64>,
    pub rsi_avg_loss: Vec<f64>,
    pub rsi: Vec<f64>,
    pub rsi_avg: Vec<f64>,
    pub rsi_u: Vec<f64>,
    pub rsi_d: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,
}

impl IndicatorColumns {
    /// Column names, in row order.
    pub const NAMES: [&'static str; 20] = [
        "w_p",
        "ema_fast",
        "ema_fast_u",
        "ema_fast_d",
        "ema_slow",
        "ema_slow_u",
        "ema_slow_d",
        "ema_long",
        "ema_long_u",
        "ema_long_d",
        "vol_avg",
        "rsi_avg_gain",
        "rsi_avg_loss",
        "rsi",
        "rsi_avg",
        "rsi_u",
        "rsi_d",
        "macd",
        "macd_signal",
        "macd_hist",
    ];

    fn all(&self) -> [&Vec<f64>; 20] {
        [
            &self.w_p,
            &self.ema_fast,
            &self.ema_fast_u,
            &self.ema_fast_d,
            &self.ema_slow,
            &self.ema_slow_u,
            &self.ema_slow_d,
            &self.ema_long,
            &self.ema_long_u,
            &self.ema_long_d,
            &self.vol_avg,
            &self.rsi_avg_gain,
            &self.rsi_avg_loss,
            &self.rsi,
            &self.rsi_avg,
            &self.rsi_u,
            &self.rsi_d,
            &self.macd,
            &self.macd_signal,
            &self.macd_hist,
        ]
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        let idx = Self::NAMES.iter().position(|n| *n == name)?;
        let column: &Vec<f64> = self.all()[idx];
        Some(column.as_slice())
    }

    fn slice_from(&self, start: usize) -> Self {
        let s = |v: &Vec<f64>| v[start..].to_vec();
        Self {
            w_p: s(&self.w_p),
            ema_fast: s(&self.ema_fast),
            ema_fast_u: s(&self.ema_fast_u),
            ema_fast_d: s(&self.ema_fast_d),
            ema_slow: s(&self.ema_slow),
            ema_slow_u: s(&self.ema_slow_u),
            ema_slow_d: s(&self.ema_slow_d),
            ema_long: s(&self.ema_long),
            ema_long_u: s(&self.ema_long_u),
            ema_long_d: s(&self.ema_long_d),
            vol_avg: s(&self.vol_avg),
            rsi_avg_gain: s(&self.rsi_avg_gain),
            rsi_avg_loss: s(&self.rsi_avg_loss),
            rsi: s(&self.rsi),
            rsi_avg: s(&self.rsi_avg),
            rsi_u: s(&self.rsi_u),
            rsi_d: s(&self.rsi_d),
            macd: s(&self.macd),
            macd_signal: s(&self.macd_signal),
            macd_hist: s(&self.macd_hist),
        }
    }
}

/// One bar together with its derived values. `None` marks an undefined value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: Bar,
    pub w_p: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_fast_u: Option<f64>,
    pub ema_fast_d: Option<f64>,
    pub ema_slow: Option<f64>,
    pub ema_slow_u: Option<f64>,
    pub ema_slow_d: Option<f64>,
    pub ema_long: Option<f64>,
    pub ema_long_u: Option<f64>,
    pub ema_long_d: Option<f64>,
    pub vol_avg: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi_avg: Option<f64>,
    pub rsi_u: Option<f64>,
    pub rsi_d: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
}

fn defined(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Bars plus aligned indicator columns.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    bars: Vec<Bar>,
    columns: IndicatorColumns,
}

impl IndicatorSeries {
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn columns(&self) -> &IndicatorColumns {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The last `count` rows (the plotting window).
    pub fn tail(&self, count: usize) -> Self {
        let start = self.bars.len().saturating_sub(count);
        Self {
            bars: self.bars[start..].to_vec(),
            columns: self.columns.slice_from(start),
        }
    }

    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        let bar = *self.bars.get(i)?;
        let c = &self.columns;
        Some(IndicatorRow {
            bar,
            w_p: defined(c.w_p[i]),
            ema_fast: defined(c.ema_fast[i]),
            ema_fast_u: defined(c.ema_fast_u[i]),
            ema_fast_d: defined(c.ema_fast_d[i]),
            ema_slow: defined(c.ema_slow[i]),
            ema_slow_u: defined(c.ema_slow_u[i]),
            ema_slow_d: defined(c.ema_slow_d[i]),
            ema_long: defined(c.ema_long[i]),
            ema_long_u: defined(c.ema_long_u[i]),
            ema_long_d: defined(c.ema_long_d[i]),
            vol_avg: defined(c.vol_avg[i]),
            rsi: defined(c.rsi[i]),
            rsi_avg: defined(c.rsi_avg[i]),
            rsi_u: defined(c.rsi_u[i]),
            rsi_d: defined(c.rsi_d[i]),
            macd: defined(c.macd[i]),
            macd_signal: defined(c.macd_signal[i]),
            macd_hist: defined(c.macd_hist[i]),
        })
    }

    pub fn rows(&self) -> Vec<IndicatorRow> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }
}

// =============================================================================
// compute_indicators
// =============================================================================

/// Compute every indicator column for `series`.
///
/// Pure: the input is only read and the same input always yields the same
/// output.
///
/// # Errors
/// - `InvalidParameter` when `params` fails validation.
/// - `InsufficientHistory` when the series is empty or shorter than the RSI
///   lookback.
pub fn compute_indicators(series: &QuoteSeries, params: &IndicatorParams) -> Result<IndicatorSeries> {
    params.validate()?;

    let bars = series.bars();
    if bars.is_empty() || bars.len() < params.rsi_period {
        return Err(ChartError::InsufficientHistory {
            required: params.rsi_period,
            available: bars.len(),
        });
    }

    let w_p: Vec<f64> = bars.iter().map(Bar::weighted_price).collect();
    let ranges: Vec<f64> = bars.iter().map(Bar::range).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume / params.volume_scale).collect();

    let rsi = calculate_rsi(&w_p, &params.rsi_params())?;

    let fast = banded_average(&w_p, &ranges, params.ma_fast, params.band_scale);
    let slow = banded_average(&w_p, &ranges, params.ma_slow, params.band_scale);
    let long = banded_average(&w_p, &ranges, params.ma_long, params.band_scale);

    let vol_avg = ewm_mean(&volumes, params.ma_vol);
    let macd = calculate_macd(&closes, &params.macd_params());

    debug!(
        rows = bars.len(),
        rsi_period = params.rsi_period,
        rsi_scale = %params.rsi_scale,
        "indicators computed"
    );

    Ok(IndicatorSeries {
        bars: bars.to_vec(),
        columns: IndicatorColumns {
            w_p,
            ema_fast: fast.middle,
            ema_fast_u: fast.upper,
            ema_fast_d: fast.lower,
            ema_slow: slow.middle,
            ema_slow_u: slow.upper,
            ema_slow_d: slow.lower,
            ema_long: long.middle,
            ema_long_u: long.upper,
            ema_long_d: long.lower,
            vol_avg,
            rsi_avg_gain: rsi.avg_gain,
            rsi_avg_loss: rsi.avg_loss,
            rsi: rsi.rsi,
            rsi_avg: rsi.rsi_avg,
            rsi_u: rsi.rsi_u,
            rsi_d: rsi.rsi_d,
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_hist: macd.histogram,
        },
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::rsi::LOSS_FLOOR;
    use crate::types::test_support::{day, last_bars, series_from_closes};

    fn small_params(rsi_period: usize) -> IndicatorParams {
        IndicatorParams {
            rsi_period,
            rsi_avg: 5,
            ..IndicatorParams::default()
        }
    }

    /// Trend plus two cycles, with a volume profile that varies by row.
    fn synthetic(len: usize) -> QuoteSeries {
        let bars = (0..len)
            .map(|i| {
                let t = i as f64;
                let close = 100.0 + 0.05 * t + 4.0 * (t / 11.0).sin() + 1.5 * (t / 3.0).cos();
                Bar {
                    date: day(i),
                    open: close - 0.3,
                    high: close + 1.0 + 0.5 * (t / 7.0).sin().abs(),
                    low: close - 1.0,
                    close,
                    volume: 2_000_000.0 + 500_000.0 * (t / 5.0).sin(),
                }
            })
            .collect();
        QuoteSeries::new(bars).unwrap()
    }

    fn bits(v: &[f64]) -> Vec<u64> {
        v.iter().map(|x| x.to_bits()).collect()
    }

    // ---- failures ----------------------------------------------------------

    #[test]
    fn empty_series_is_insufficient() {
        let err = compute_indicators(&QuoteSeries::default(), &small_params(10)).unwrap_err();
        assert!(matches!(
            err,
            ChartError::InsufficientHistory { required: 10, available: 0 }
        ));
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = compute_indicators(&synthetic(149), &IndicatorParams::default()).unwrap_err();
        assert!(matches!(
            err,
            ChartError::InsufficientHistory { required: 150, available: 149 }
        ));
    }

    #[test]
    fn zero_span_is_rejected() {
        let params = IndicatorParams {
            ma_slow: 0,
            ..small_params(10)
        };
        let err = compute_indicators(&synthetic(40), &params).unwrap_err();
        assert!(matches!(err, ChartError::InvalidParameter { name: "ma_slow", .. }));
    }

    #[test]
    fn zero_volume_scale_is_rejected() {
        let params = IndicatorParams {
            volume_scale: 0.0,
            ..small_params(10)
        };
        assert!(params.validate().is_err());
    }

    // ---- shape -------------------------------------------------------------

    #[test]
    fn every_column_is_aligned() {
        let out = compute_indicators(&synthetic(200), &small_params(20)).unwrap();
        assert_eq!(out.len(), 200);
        for name in IndicatorColumns::NAMES {
            assert_eq!(out.column(name).unwrap().len(), 200, "column {name}");
        }
        assert!(out.column("nope").is_none());
    }

    #[test]
    fn weighted_price_column() {
        let series = synthetic(30);
        let out = compute_indicators(&series, &small_params(10)).unwrap();
        for (b, wp) in series.bars().iter().zip(&out.columns().w_p) {
            assert!((0.25 * (2.0 * b.close + b.high + b.low) - wp).abs() < 1e-12);
        }
    }

    #[test]
    fn volume_is_scaled_but_bars_are_untouched() {
        let series = synthetic(30);
        let out = compute_indicators(&series, &small_params(10)).unwrap();
        assert_eq!(out.bars(), series.bars());
        // First value of the average is the first scaled volume.
        assert!((out.columns().vol_avg[0] - series.bars()[0].volume / 1e6).abs() < 1e-12);
    }

    #[test]
    fn slow_band_is_half_smoothed_range_times_scale() {
        let out = compute_indicators(&synthetic(120), &small_params(10)).unwrap();
        let ranges: Vec<f64> = out.bars().iter().map(Bar::range).collect();
        let h_l = ewm_mean(&ranges, 25);
        let c = out.columns();
        for i in 0..120 {
            assert!((c.ema_slow_u[i] - (c.ema_slow[i] + 0.5 * h_l[i] * 2.0)).abs() < 1e-9);
            assert!((c.ema_slow_d[i] - (c.ema_slow[i] - 0.5 * h_l[i] * 2.0)).abs() < 1e-9);
        }
    }

    // ---- properties --------------------------------------------------------

    #[test]
    fn flat_prices_give_neutral_rsi_and_zero_macd() {
        let out = compute_indicators(&series_from_closes(&[50.0; 120]), &small_params(30)).unwrap();
        let c = out.columns();
        for i in 30..120 {
            assert!((c.rsi[i] - 50.0).abs() < 1e-9, "rsi row {i}: {}", c.rsi[i]);
            assert!((c.rsi_avg[i] - 50.0).abs() < 1e-9);
        }
        for i in 0..120 {
            assert!(c.macd[i].abs() < 1e-12);
            assert!(c.macd_hist[i].abs() < 1e-12);
        }
    }

    #[test]
    fn flat_prices_centered_sit_at_zero() {
        let params = IndicatorParams {
            rsi_scale: RsiScale::Centered,
            ..small_params(30)
        };
        let out = compute_indicators(&series_from_closes(&[50.0; 120]), &params).unwrap();
        for &v in &out.columns().rsi[30..] {
            assert!(v.abs() < 1e-9);
        }
    }

    #[test]
    fn rising_closes_saturate_without_nan() {
        let closes: Vec<f64> = (0..200).map(|i| 10.0 + i as f64 * 0.25).collect();
        let out = compute_indicators(&series_from_closes(&closes), &small_params(50)).unwrap();
        let c = out.columns();
        for i in 50..200 {
            assert!(c.rsi[i].is_finite());
            assert!(c.rsi[i] > 99.999, "row {i}: {}", c.rsi[i]);
            assert!(c.rsi_avg[i].is_finite());
        }
    }

    #[test]
    fn twenty_row_ascending_scenario() {
        let closes: Vec<f64> = (100..120).map(f64::from).collect();
        let series = series_from_closes(&closes);

        let out = compute_indicators(&series, &small_params(10)).unwrap();
        let c = out.columns();
        for i in 10..20 {
            assert!((c.rsi_avg_loss[i] - LOSS_FLOOR).abs() < 1e-20, "avg_loss row {i}");
            assert!(c.rsi_avg_gain[i] / c.rsi_avg_loss[i] > 1e8, "rs row {i}");
            assert!((c.rsi[i] - 100.0).abs() < 1e-6, "rsi row {i}");
        }

        let centered = IndicatorParams {
            rsi_scale: RsiScale::Centered,
            ..small_params(10)
        };
        let out = compute_indicators(&series, &centered).unwrap();
        for &v in &out.columns().rsi[10..] {
            assert!((v - 50.0).abs() < 1e-6);
        }
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let series = synthetic(300);
        let params = IndicatorParams::default();
        let a = compute_indicators(&series, &params).unwrap();
        let b = compute_indicators(&series, &params).unwrap();
        assert_eq!(a.bars(), b.bars());
        for name in IndicatorColumns::NAMES {
            assert_eq!(
                bits(a.column(name).unwrap()),
                bits(b.column(name).unwrap()),
                "column {name}"
            );
        }
    }

    #[test]
    fn warm_up_rows_are_undefined() {
        let n = 150;
        let out = compute_indicators(&synthetic(450), &IndicatorParams::default()).unwrap();
        let c = out.columns();
        for i in 0..450 {
            let cols = [c.rsi[i], c.rsi_avg[i], c.rsi_u[i], c.rsi_d[i]];
            if i < n {
                assert!(cols.iter().all(|v| v.is_nan()), "row {i}");
            } else {
                assert!(cols.iter().all(|v| v.is_finite()), "row {i}");
            }
        }
        let row = out.row(n - 1).unwrap();
        assert!(row.rsi.is_none());
        assert!(row.ema_slow.is_some());
        assert!(out.row(n).unwrap().rsi.is_some());
    }

    #[test]
    fn tail_is_a_slice_of_the_full_computation() {
        let full = compute_indicators(&synthetic(450), &IndicatorParams::default()).unwrap();
        let window = full.tail(300);
        assert_eq!(window.len(), 300);
        assert_eq!(window.bars(), &full.bars()[150..]);
        for name in IndicatorColumns::NAMES {
            assert_eq!(
                bits(window.column(name).unwrap()),
                bits(&full.column(name).unwrap()[150..]),
                "column {name}"
            );
        }
        assert_eq!(full.tail(1_000).len(), 450);
    }

    #[test]
    fn slicing_before_computing_corrupts_the_window_start() {
        let series = synthetic(450);
        let params = IndicatorParams::default();

        let correct = compute_indicators(&series, &params).unwrap().tail(300);
        let pre_sliced = compute_indicators(&last_bars(&series, 300), &params).unwrap();

        assert_eq!(correct.bars(), pre_sliced.bars());
        let (c, p) = (correct.columns(), pre_sliced.columns());

        // Long average restarts from the first sliced row.
        assert!((c.ema_long[0] - p.ema_long[0]).abs() > 1e-6);
        // RSI is defined at the window start only when warm-up rows were kept.
        assert!(c.rsi[0].is_finite());
        assert!(p.rsi[0].is_nan());
        // MACD differs early in the window.
        assert!((c.macd[5] - p.macd[5]).abs() > 1e-9);
    }

    #[test]
    fn rows_serialise_undefined_as_null() {
        let out = compute_indicators(&synthetic(40), &small_params(10)).unwrap();
        let rows = out.rows();
        assert_eq!(rows.len(), 40);

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert!(json["rsi"].is_null());
        assert!(json["close"].is_number());
        assert!(json["date"].is_string());

        let back: IndicatorRow = serde_json::from_value(json).unwrap();
        assert_eq!(back.bar.date, rows[0].bar.date);
        assert!(back.rsi.is_none());
        assert!((back.w_p.unwrap() - rows[0].w_p.unwrap()).abs() < 1e-9);
    }
}
