// =============================================================================
// Quote Cache — keyed on-disk store of fetched daily history
// =============================================================================
//
// One JSON file holds the whole mapping `symbol -> {window_days, series}`. A
// lookup reads the file; a store reads it, replaces one entry and rewrites the
// file atomically (unique temp file + rename), so concurrent runs never tear
// the file; the last writer wins. Entries never expire: a hit only requires the
// same window length.
//
// Writers in this process serialise on `write_lock` for the read-modify-write
// cycle. The provider call happens outside the lock.
// =============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ChartError, Result};
use crate::market_data::provider::QuoteProvider;
use crate::types::QuoteSeries;

/// One cached fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub window_days: u32,
    pub series: QuoteSeries,
}

type CacheMap = BTreeMap<String, CacheEntry>;

/// Quote retrieval with an optional file-backed cache in front of a provider.
pub struct QuoteCache<P> {
    provider: P,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl<P: QuoteProvider> QuoteCache<P> {
    pub fn new(provider: P, path: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Return daily history for `symbol` covering `window_days`.
    ///
    /// With `use_cache == false` this always calls the provider and never
    /// touches the cache file. Otherwise a stored entry with the same window
    /// is returned as-is, and anything else triggers a fetch that replaces the
    /// symbol's entry.
    pub async fn get_quotes(&self, symbol: &str, window_days: u32, use_cache: bool) -> Result<QuoteSeries> {
        if symbol.trim().is_empty() {
            return Err(ChartError::invalid("symbol", "must not be empty"));
        }
        if window_days == 0 {
            return Err(ChartError::invalid("window_days", "must be at least 1"));
        }

        if !use_cache {
            return self.fetch(symbol, window_days).await;
        }

        if let Some(entry) = self.load_or_empty().remove(symbol) {
            if entry.window_days == window_days && !entry.series.is_empty() {
                debug!(symbol, window_days, rows = entry.series.len(), "quote cache hit");
                return Ok(entry.series);
            }
            debug!(
                symbol,
                cached_window = entry.window_days,
                window_days,
                "quote cache window mismatch"
            );
        }

        let series = self.fetch(symbol, window_days).await?;
        self.store(
            symbol,
            CacheEntry {
                window_days,
                series: series.clone(),
            },
        )?;
        Ok(series)
    }

    /// Provider call that treats an empty answer as missing data.
    async fn fetch(&self, symbol: &str, window_days: u32) -> Result<QuoteSeries> {
        let series = self.provider.fetch_daily(symbol, window_days).await?;
        if series.is_empty() {
            return Err(ChartError::unavailable(symbol, "provider returned no rows"));
        }
        Ok(series)
    }

    /// Symbols that currently have an entry.
    pub fn symbols(&self) -> Vec<String> {
        self.load_or_empty().into_keys().collect()
    }

    /// Drop the entry for `symbol`. Returns whether one existed.
    pub fn invalidate(&self, symbol: &str) -> Result<bool> {
        let _guard = self.write_lock.lock();
        let mut map = self.load_or_empty();
        let existed = map.remove(symbol).is_some();
        if existed {
            self.write_map(&map)?;
            info!(symbol, "quote cache entry removed");
        }
        Ok(existed)
    }

    // -------------------------------------------------------------------------
    // File access
    // -------------------------------------------------------------------------

    /// Read the whole mapping. A missing file is an empty mapping.
    pub fn load(&self) -> Result<BTreeMap<String, CacheEntry>> {
        if !self.path.exists() {
            return Ok(CacheMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ChartError::CacheCorrupt(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| ChartError::CacheCorrupt(format!("{}: {e}", self.path.display())))
    }

    fn load_or_empty(&self) -> CacheMap {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable quote cache");
            CacheMap::new()
        })
    }

    fn store(&self, symbol: &str, entry: CacheEntry) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut map = self.load_or_empty();
        let rows = entry.series.len();
        map.insert(symbol.to_string(), entry);
        self.write_map(&map)?;
        info!(symbol, rows, symbols = map.len(), "quote cache updated");
        Ok(())
    }

    /// Atomic write: serialise to a uniquely named temp file in the same
    /// directory, then rename it over the cache file.
    fn write_map(&self, map: &CacheMap) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, map)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::market_data::provider::test_support::StubProvider;

    fn closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 10.0 + i as f64).collect()
    }

    fn cache_in(dir: &tempfile::TempDir, provider: StubProvider) -> QuoteCache<StubProvider> {
        QuoteCache::new(provider, dir.path().join("charts").join("quotes.json"))
    }

    #[tokio::test]
    async fn without_cache_always_fetches_and_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("QQQ", &closes(50)));

        let a = cache.get_quotes("QQQ", 30, false).await.unwrap();
        let b = cache.get_quotes("QQQ", 30, false).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
        assert_eq!(cache.provider().calls(), 2);
        assert!(!cache.path().exists());
    }

    #[tokio::test]
    async fn second_call_is_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("QQQ", &closes(50)));

        let first = cache.get_quotes("QQQ", 30, true).await.unwrap();
        let second = cache.get_quotes("QQQ", 30, true).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.provider().calls(), 1);
        assert!(cache.path().exists());
        assert_eq!(cache.symbols(), vec!["QQQ".to_string()]);
    }

    #[tokio::test]
    async fn entries_survive_a_new_cache_instance() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("QQQ", &closes(50)));
        let first = cache.get_quotes("QQQ", 30, true).await.unwrap();

        let reopened = cache_in(&dir, StubProvider::with("QQQ", &closes(50)));
        let again = reopened.get_quotes("QQQ", 30, true).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(reopened.provider().calls(), 0);
    }

    #[tokio::test]
    async fn different_window_refetches_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("QQQ", &closes(50)));

        cache.get_quotes("QQQ", 30, true).await.unwrap();
        let wider = cache.get_quotes("QQQ", 40, true).await.unwrap();
        assert_eq!(wider.len(), 40);
        assert_eq!(cache.provider().calls(), 2);

        let stored = cache.load().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored["QQQ"].window_days, 40);

        // The old window is gone: asking for it again refetches.
        cache.get_quotes("QQQ", 30, true).await.unwrap();
        assert_eq!(cache.provider().calls(), 3);
    }

    #[tokio::test]
    async fn symbols_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = StubProvider::with("QQQ", &closes(50)).and("SPY", &closes(60));
        let cache = cache_in(&dir, provider);

        cache.get_quotes("QQQ", 30, true).await.unwrap();
        cache.get_quotes("SPY", 30, true).await.unwrap();
        assert_eq!(cache.symbols(), vec!["QQQ".to_string(), "SPY".to_string()]);
    }

    #[tokio::test]
    async fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("QQQ", &closes(50)));
        std::fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        std::fs::write(cache.path(), b"{ not json").unwrap();

        assert!(matches!(cache.load().unwrap_err(), ChartError::CacheCorrupt(_)));

        let series = cache.get_quotes("QQQ", 30, true).await.unwrap();
        assert_eq!(series.len(), 30);
        assert_eq!(cache.provider().calls(), 1);
        // The rewrite replaced the corrupt content.
        assert!(cache.load().is_ok());
    }

    #[tokio::test]
    async fn provider_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("QQQ", &closes(50)));

        let err = cache.get_quotes("NOPE", 30, true).await.unwrap_err();
        assert!(matches!(err, ChartError::DataUnavailable { .. }));
        assert!(!cache.path().exists());
    }

    #[tokio::test]
    async fn empty_provider_answer_is_unavailable_and_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("EMPTY", &[]));

        for use_cache in [true, true, false] {
            let err = cache.get_quotes("EMPTY", 30, use_cache).await.unwrap_err();
            assert!(matches!(err, ChartError::DataUnavailable { .. }), "{err:?}");
        }
        // Every call went to the provider; nothing was stored.
        assert_eq!(cache.provider().calls(), 3);
        assert!(cache.symbols().is_empty());
        assert!(!cache.path().exists());
    }

    #[tokio::test]
    async fn stored_empty_entry_is_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("QQQ", &closes(50)));
        std::fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        std::fs::write(cache.path(), r#"{"QQQ":{"window_days":30,"series":[]}}"#).unwrap();

        let series = cache.get_quotes("QQQ", 30, true).await.unwrap();
        assert_eq!(series.len(), 30);
        assert_eq!(cache.provider().calls(), 1);
    }

    #[tokio::test]
    async fn rewrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let provider = StubProvider::with("QQQ", &closes(50)).and("SPY", &closes(50));
        let cache = cache_in(&dir, provider);
        cache.get_quotes("QQQ", 30, true).await.unwrap();
        cache.get_quotes("SPY", 30, true).await.unwrap();
        assert!(cache.invalidate("QQQ").unwrap());

        let names: Vec<String> = std::fs::read_dir(cache.path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["quotes.json".to_string()]);
    }

    #[tokio::test]
    async fn rejects_bad_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, StubProvider::with("QQQ", &closes(5)));
        assert!(cache.get_quotes("", 30, true).await.is_err());
        assert!(cache.get_quotes("QQQ", 0, true).await.is_err());
        assert_eq!(cache.provider().calls(), 0);
    }

    #[tokio::test]
    async fn invalidate_removes_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let provider = StubProvider::with("QQQ", &closes(50)).and("SPY", &closes(60));
        let cache = cache_in(&dir, provider);
        cache.get_quotes("QQQ", 30, true).await.unwrap();
        cache.get_quotes("SPY", 30, true).await.unwrap();

        assert!(cache.invalidate("QQQ").unwrap());
        assert!(!cache.invalidate("QQQ").unwrap());
        assert_eq!(cache.symbols(), vec!["SPY".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_writers_keep_every_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let mut provider = StubProvider::default();
        let symbols: Vec<String> = (0..8).map(|i| format!("T{i}")).collect();
        for sym in &symbols {
            provider = provider.and(sym, &closes(20));
        }
        let cache = Arc::new(cache_in(&dir, provider));

        let handles: Vec<_> = symbols
            .iter()
            .cloned()
            .map(|sym| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_quotes(&sym, 10, true).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(cache.load().unwrap().len(), symbols.len());
    }
}
