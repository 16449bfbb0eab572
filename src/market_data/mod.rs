pub mod cache;
pub mod provider;
pub mod yahoo;

// Re-exports for convenient access (e.g. `use crate::market_data::QuoteCache`).
pub use cache::{CacheEntry, QuoteCache};
pub use provider::QuoteProvider;
pub use yahoo::YahooClient;
