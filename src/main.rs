// =============================================================================
// quote-charts — Main Entry Point
// =============================================================================
//
// `chart`  fetch quotes (through the cache), compute indicators and write one
//          chart artifact per ticker
// `review` list previously written charts or summarise one
// `cache`  inspect or prune the quote cache
// `init`   write the effective settings out as a config file
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use quote_charts::chart::{self, ChartArtifact};
use quote_charts::{ChartConfig, QuoteCache, QuoteProvider, RsiScale, YahooClient};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "chart_config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chart one or more tickers
    Chart {
        /// Tickers, comma or space separated (defaults to the configured list)
        tickers: Vec<String>,

        /// Always fetch fresh quotes
        #[arg(long)]
        no_cache: bool,

        /// Add MACD overlays to the oscillator panel
        #[arg(long)]
        macd: bool,

        /// Present RSI centered on 0 instead of 50
        #[arg(long)]
        centered_rsi: bool,
    },

    /// List charted tickers, or summarise one
    Review {
        ticker: Option<String>,
    },

    /// Inspect or prune the quote cache
    Cache {
        /// Remove the entry for this ticker
        #[arg(long)]
        remove: Option<String>,
    },

    /// Write the current settings (defaults plus environment) to the config path
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ChartConfig::load(&cli.config).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ChartConfig::default()
    });
    config.apply_env();

    match cli.command {
        Commands::Chart {
            tickers,
            no_cache,
            macd,
            centered_rsi,
        } => {
            if no_cache {
                config.use_cache = false;
            }
            if macd {
                config.show_macd = true;
            }
            if centered_rsi {
                config.indicators.rsi_scale = RsiScale::Centered;
            }
            config.validate()?;
            run_chart(&config, &tickers).await
        }
        Commands::Review { ticker } => run_review(&config, ticker.as_deref()),
        Commands::Cache { remove } => run_cache(&config, remove.as_deref()),
        Commands::Init { force } => {
            config.validate()?;
            if config.save(&cli.config, force)? {
                println!("wrote {}", cli.config.display());
            } else {
                println!("{} exists, use --force to replace it", cli.config.display());
            }
            Ok(())
        }
    }
}

fn quote_cache(config: &ChartConfig) -> Result<QuoteCache<Arc<dyn QuoteProvider>>> {
    let provider: Arc<dyn QuoteProvider> =
        Arc::new(YahooClient::new().context("failed to build market data client")?);
    Ok(QuoteCache::new(provider, config.cache_path()))
}

// ── chart ────────────────────────────────────────────────────────────────────

async fn run_chart(config: &ChartConfig, tickers: &[String]) -> Result<()> {
    let symbols = config.resolve_tickers(tickers);
    anyhow::ensure!(!symbols.is_empty(), "no tickers to chart");

    info!(
        symbols = ?symbols,
        use_cache = config.use_cache,
        root = %config.chart_root_path().display(),
        "charting"
    );

    let cache = quote_cache(config)?;
    let outcomes = chart::chart_batch(&cache, config, &symbols).await;

    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!("{:<8} {}", outcome.symbol, path.display()),
            Err(e) => {
                failed += 1;
                error!(symbol = %outcome.symbol, error = %e, "invalid ticker");
                println!("{:<8} error: {e}", outcome.symbol);
            }
        }
    }

    anyhow::ensure!(failed < outcomes.len(), "every ticker failed");
    Ok(())
}

// ── review ───────────────────────────────────────────────────────────────────

fn run_review(config: &ChartConfig, ticker: Option<&str>) -> Result<()> {
    let root = config.chart_root_path();

    let Some(ticker) = ticker else {
        let tickers = chart::list_charts(&root)
            .with_context(|| format!("failed to list charts in {}", root.display()))?;
        if tickers.is_empty() {
            println!("no charts in {}", root.display());
        }
        for t in tickers {
            println!("{t}");
        }
        return Ok(());
    };

    let symbol = ticker.to_uppercase();
    anyhow::ensure!(chart::is_valid_ticker(&symbol), "malformed ticker {ticker:?}");
    let artifact = ChartArtifact::load(&root, &symbol)
        .with_context(|| format!("no chart for {symbol} in {}", root.display()))?;

    let first = artifact.rows.first().map(|r| r.bar.date);
    let last = artifact.rows.last();
    println!("{}  generated {}", artifact.symbol, artifact.generated_at.to_rfc3339());
    if let (Some(first), Some(last)) = (first, last) {
        println!("rows      {} ({} .. {})", artifact.rows.len(), first, last.bar.date);
        println!("close     {:.2}", last.bar.close);
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        println!("ema_slow  {}", fmt(last.ema_slow));
        println!("ema_long  {}", fmt(last.ema_long));
        println!("rsi       {}", fmt(last.rsi));
        println!("rsi_avg   {}", fmt(last.rsi_avg));
        println!("macd      {}", fmt(last.macd));
    }
    Ok(())
}

// ── cache ────────────────────────────────────────────────────────────────────

fn run_cache(config: &ChartConfig, remove: Option<&str>) -> Result<()> {
    let cache = quote_cache(config)?;

    if let Some(symbol) = remove {
        let symbol = symbol.to_uppercase();
        let removed = cache
            .invalidate(&symbol)
            .with_context(|| format!("failed to update {}", cache.path().display()))?;
        println!("{symbol}: {}", if removed { "removed" } else { "not cached" });
        return Ok(());
    }

    let entries = cache
        .load()
        .with_context(|| format!("failed to read {}", cache.path().display()))?;
    println!("{}", cache.path().display());
    for (symbol, entry) in entries {
        println!(
            "{:<8} {:>4}d  {} rows  {} .. {}",
            symbol,
            entry.window_days,
            entry.series.len(),
            entry.series.first_date().map(|d| d.to_string()).unwrap_or_default(),
            entry.series.last_date().map(|d| d.to_string()).unwrap_or_default(),
        );
    }
    Ok(())
}
