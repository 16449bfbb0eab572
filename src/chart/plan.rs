// =============================================================================
// Chart Plan — overlay and style description for the external renderer
// =============================================================================
//
// The renderer draws a candlestick chart with three stacked panels:
//
//   panel 0  price      ema_slow (dashed) with its band, ema_long
//   panel 1  oscillator rsi, rsi_avg (dashed) with its band; optional MACD
//   panel 2  volume     vol_avg over the volume bars
//
// This module only names columns and styles; it never touches the data.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorParams;

pub const PRICE_PANEL: u8 = 0;
pub const OSCILLATOR_PANEL: u8 = 1;
pub const VOLUME_PANEL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Line,
    /// Bars colored green for values >= 0 and red otherwise.
    SignedBar,
}

/// One named series drawn on top of the candles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub column: String,
    pub panel: u8,
    pub kind: PlotKind,
    pub color: String,
    pub style: LineStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Overlay {
    fn line(column: &str, panel: u8, color: &str) -> Self {
        Self {
            column: column.to_string(),
            panel,
            kind: PlotKind::Line,
            color: color.to_string(),
            style: LineStyle::Solid,
            width: None,
            title: None,
        }
    }

    fn dashed(mut self) -> Self {
        self.style = LineStyle::Dashed;
        self
    }

    fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Figure-level parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub base_style: String,
    pub chart_type: String,
    pub panel_ratios: Vec<u32>,
    pub figsize: (f64, f64),
    /// Spans of the renderer's own moving averages on the close.
    pub mav: Vec<usize>,
    pub volume_panel: u8,
    pub datetime_format: String,
    pub show_nontrading: bool,
}

impl ChartStyle {
    fn for_params(params: &IndicatorParams) -> Self {
        Self {
            base_style: "yahoo".to_string(),
            chart_type: "candle".to_string(),
            panel_ratios: vec![4, 3, 1],
            figsize: (10.0, 8.0),
            mav: vec![params.ma_fast],
            volume_panel: VOLUME_PANEL,
            datetime_format: "%m-%d".to_string(),
            show_nontrading: true,
        }
    }
}

/// Everything the renderer needs besides the rows themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPlan {
    pub overlays: Vec<Overlay>,
    pub style: ChartStyle,
}

impl ChartPlan {
    /// The standard three-panel layout for `symbol`.
    pub fn for_symbol(symbol: &str, params: &IndicatorParams, show_macd: bool) -> Self {
        let mut overlays = vec![
            // panel 0
            Overlay::line("ema_slow", PRICE_PANEL, "red").dashed(),
            Overlay::line("ema_slow_u", PRICE_PANEL, "b"),
            Overlay::line("ema_slow_d", PRICE_PANEL, "b"),
            Overlay::line("ema_long", PRICE_PANEL, "green"),
        ];

        if show_macd {
            overlays.extend([
                Overlay::line("macd", OSCILLATOR_PANEL, "fuchsia").titled("MACD"),
                Overlay {
                    kind: PlotKind::SignedBar,
                    ..Overlay::line("macd_hist", OSCILLATOR_PANEL, "dimgray")
                },
                Overlay::line("macd_signal", OSCILLATOR_PANEL, "b"),
            ]);
        }

        overlays.extend([
            // panel 1
            Overlay::line("rsi", OSCILLATOR_PANEL, "black")
                .width(1.0)
                .titled(format!("{symbol} - RSI")),
            Overlay::line("rsi_avg", OSCILLATOR_PANEL, "red").dashed(),
            Overlay::line("rsi_u", OSCILLATOR_PANEL, "b"),
            Overlay::line("rsi_d", OSCILLATOR_PANEL, "b"),
            // panel 2
            Overlay::line("vol_avg", VOLUME_PANEL, "k"),
        ]);

        Self {
            overlays,
            style: ChartStyle::for_params(params),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.overlays.iter().map(|o| o.column.as_str())
    }
}
