// =============================================================================
// Runtime Configuration — charting settings with atomic save
// =============================================================================
//
// Every tunable lives here: quote window, plot window, batch limits, cache
// location and the indicator parameters. Nothing is read from globals; the
// struct is passed explicitly to the cache and the pipeline.
//
// `quote-charts init` writes this struct out as a starting config file. Every
// field carries a serde default, so a partial or older file still loads.
//
// =============================================================================

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::indicators::IndicatorParams;

/// Overrides `chart_root`.
pub const ENV_CHART_ROOT: &str = "QUOTE_CHARTS_ROOT";
/// Comma/space separated tickers used when none are given on the command line.
pub const ENV_TICKERS: &str = "QUOTE_CHARTS_TICKERS";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_tickers() -> Vec<String> {
    vec!["QQQ".to_string()]
}

fn default_num_days_quote() -> u32 {
    450
}

fn default_num_days_plot() -> usize {
    300
}

fn default_max_num_tickers() -> usize {
    20
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_chart_root() -> String {
    "~/charts".to_string()
}

fn default_cache_file_name() -> String {
    "df_quotes_cache.json".to_string()
}

// =============================================================================
// ChartConfig
// =============================================================================

/// Top-level configuration for quote retrieval and charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    // --- Tickers & windows --------------------------------------------------

    /// Tickers charted when none are passed explicitly.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// Calendar days of history requested from the provider.
    #[serde(default = "default_num_days_quote")]
    pub num_days_quote: u32,

    /// Rows kept for display after the indicators are computed.
    #[serde(default = "default_num_days_plot")]
    pub num_days_plot: usize,

    /// Upper bound on tickers handled per batch.
    #[serde(default = "default_max_num_tickers")]
    pub max_num_tickers: usize,

    /// Symbols processed concurrently within a batch.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    // --- Storage ------------------------------------------------------------

    /// Whether fetched quotes go through the on-disk cache.
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Directory for chart artifacts and the quote cache. `~` expands to $HOME.
    #[serde(default = "default_chart_root")]
    pub chart_root: String,

    /// File name of the quote cache inside `chart_root`.
    #[serde(default = "default_cache_file_name")]
    pub cache_file_name: String,

    // --- Presentation -------------------------------------------------------

    /// Add MACD overlays to the oscillator panel.
    #[serde(default)]
    pub show_macd: bool,

    // --- Indicators ---------------------------------------------------------

    #[serde(default)]
    pub indicators: IndicatorParams,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            num_days_quote: default_num_days_quote(),
            num_days_plot: default_num_days_plot(),
            max_num_tickers: default_max_num_tickers(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            use_cache: true,
            chart_root: default_chart_root(),
            cache_file_name: default_cache_file_name(),
            show_macd: false,
            indicators: IndicatorParams::default(),
        }
    }
}

impl ChartConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read chart config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse chart config from {}", path.display()))?;

        info!(
            path = %path.display(),
            tickers = ?config.tickers,
            num_days_quote = config.num_days_quote,
            "chart config loaded"
        );

        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating the parent directory.
    ///
    /// The file is replaced atomically. Unless `overwrite` is set an existing
    /// file is left alone and `Ok(false)` is returned.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<bool> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            info!(path = %path.display(), "chart config exists, not overwritten");
            return Ok(false);
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, self).context("failed to serialise chart config")?;
        tmp.flush()?;
        tmp.persist(path)
            .with_context(|| format!("failed to replace {}", path.display()))?;

        info!(path = %path.display(), tickers = ?self.tickers, "chart config written");
        Ok(true)
    }

    /// Tickers to chart: `requested` when given, otherwise the configured
    /// list. Either way they go through `parse_tickers`, so they come back
    /// uppercased, de-duplicated, validated and capped at `max_num_tickers`.
    pub fn resolve_tickers(&self, requested: &[String]) -> Vec<String> {
        let source = if requested.is_empty() { self.tickers.as_slice() } else { requested };
        crate::chart::parse_tickers(&source.join(" "), self.max_num_tickers)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_CHART_ROOT).ok(),
            std::env::var(ENV_TICKERS).ok(),
        );
    }

    fn apply_overrides(&mut self, chart_root: Option<String>, tickers: Option<String>) {
        if let Some(root) = chart_root.filter(|r| !r.trim().is_empty()) {
            self.chart_root = root;
        }
        if let Some(list) = tickers {
            let parsed = crate::chart::parse_tickers(&list, usize::MAX);
            if !parsed.is_empty() {
                self.tickers = parsed;
            }
        }
    }

    /// Check the settings that would otherwise fail deep inside a batch.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.num_days_quote > 0, "num_days_quote must be at least 1");
        anyhow::ensure!(self.num_days_plot > 0, "num_days_plot must be at least 1");
        anyhow::ensure!(self.max_num_tickers > 0, "max_num_tickers must be at least 1");
        anyhow::ensure!(
            self.max_concurrent_fetches > 0,
            "max_concurrent_fetches must be at least 1"
        );
        self.indicators
            .validate()
            .context("invalid indicator parameters")?;

        if (self.num_days_plot as u64) > u64::from(self.num_days_quote) {
            warn!(
                num_days_plot = self.num_days_plot,
                num_days_quote = self.num_days_quote,
                "plot window is wider than the quote window; charts will show every row"
            );
        }
        Ok(())
    }

    /// `chart_root` with a leading `~` expanded to `$HOME`.
    pub fn chart_root_path(&self) -> PathBuf {
        expand_home(&self.chart_root, std::env::var_os("HOME").map(PathBuf::from))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.chart_root_path().join(&self.cache_file_name)
    }
}

fn expand_home(raw: &str, home: Option<PathBuf>) -> PathBuf {
    match (raw.strip_prefix('~'), home) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => PathBuf::from(raw),
    }
}
