// =============================================================================
// Error types shared by the quote cache, the provider and the indicator pipeline
// =============================================================================
//
// Library code returns `Result<T, ChartError>`; the binary wraps these in
// `anyhow` at its boundary.
// =============================================================================

use thiserror::Error;

/// Errors produced while fetching quotes, computing indicators or writing
/// chart artifacts.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The provider was unreachable or returned no rows for the symbol.
    #[error("no data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Fewer rows than the RSI lookback period.
    #[error("insufficient history: need at least {required} rows, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// The on-disk cache could not be read or parsed.
    #[error("quote cache is corrupt: {0}")]
    CacheCorrupt(String),

    /// Bars were not in strictly ascending date order.
    #[error("bar dates must be strictly increasing (violated at row {index})")]
    UnorderedDates { index: usize },

    /// A span, period or scale was outside its valid range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChartError {
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
