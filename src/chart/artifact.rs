// =============================================================================
// Chart Artifacts — plot-window rows plus plan, one JSON file per symbol
// =============================================================================
//
// Artifacts live in the chart root as `{SYMBOL}.chart.json`, next to the quote
// cache file. Writes are atomic (unique temp file + rename).
// =============================================================================

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::chart::plan::ChartPlan;
use crate::error::Result;
use crate::indicators::{IndicatorRow, IndicatorSeries};

pub const ARTIFACT_SUFFIX: &str = ".chart.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub plan: ChartPlan,
    pub rows: Vec<IndicatorRow>,
}

impl ChartArtifact {
    /// `window` should already be sliced to the plotting window.
    pub fn new(symbol: &str, plan: ChartPlan, window: &IndicatorSeries) -> Self {
        Self {
            symbol: symbol.to_string(),
            generated_at: Utc::now(),
            plan,
            rows: window.rows(),
        }
    }

    pub fn file_path(chart_root: &Path, symbol: &str) -> PathBuf {
        chart_root.join(format!("{symbol}{ARTIFACT_SUFFIX}"))
    }

    /// Write to `{chart_root}/{SYMBOL}.chart.json`, creating the directory.
    pub fn write(&self, chart_root: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(chart_root)?;
        let path = Self::file_path(chart_root, &self.symbol);

        let mut tmp = NamedTempFile::new_in(chart_root)?;
        serde_json::to_writer(&mut tmp, self)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        info!(symbol = %self.symbol, rows = self.rows.len(), path = %path.display(), "chart written");
        Ok(path)
    }

    pub fn load(chart_root: &Path, symbol: &str) -> Result<Self> {
        let path = Self::file_path(chart_root, symbol);
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Tickers with a chart artifact under `chart_root`, sorted.
///
/// A missing directory means no charts yet.
pub fn list_charts(chart_root: &Path) -> Result<Vec<String>> {
    if !chart_root.exists() {
        return Ok(Vec::new());
    }
    let mut tickers: Vec<String> = std::fs::read_dir(chart_root)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(ARTIFACT_SUFFIX))
                .map(str::to_string)
        })
        .collect();
    tickers.sort();
    debug!(count = tickers.len(), root = %chart_root.display(), "charts listed");
    Ok(tickers)
}
