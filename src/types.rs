// =============================================================================
// Shared types used across quote retrieval and the indicator pipeline
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};

/// One daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    /// `0.25 * (2*close + high + low)`, the base signal for the moving averages.
    pub fn weighted_price(&self) -> f64 {
        0.25 * (2.0 * self.close + self.high + self.low)
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Daily bars in strictly ascending date order.
///
/// Gaps (weekends, holidays) are simply absent; nothing fills them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct QuoteSeries {
    bars: Vec<Bar>,
}

impl QuoteSeries {
    /// Build a series, rejecting duplicate or out-of-order dates.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        if let Some(pos) = bars.windows(2).position(|w| w[1].date <= w[0].date) {
            return Err(ChartError::UnorderedDates { index: pos + 1 });
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

impl TryFrom<Vec<Bar>> for QuoteSeries {
    type Error = ChartError;

    fn try_from(bars: Vec<Bar>) -> Result<Self> {
        Self::new(bars)
    }
}

impl From<QuoteSeries> for Vec<Bar> {
    fn from(series: QuoteSeries) -> Self {
        series.bars
    }
}

/// How RSI values are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiScale {
    /// Classic 0..100 oscillator.
    Plain,
    /// Shifted down by 50 so the neutral level sits at 0.
    Centered,
}

impl RsiScale {
    pub fn offset(self) -> f64 {
        match self {
            Self::Plain => 0.0,
            Self::Centered => 50.0,
        }
    }

    /// The value reported when price has not moved at all.
    pub fn midpoint(self) -> f64 {
        50.0 - self.offset()
    }
}

impl Default for RsiScale {
    fn default() -> Self {
        Self::Plain
    }
}

impl std::fmt::Display for RsiScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "Plain"),
            Self::Centered => write!(f, "Centered"),
        }
    }
}
