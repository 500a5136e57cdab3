//! Library layer for the Mboum proxy: cache-and-fetch coordination, lookup
//! tables, screener criteria, validation and the cached client.
//!
//! Wraps the `mboum_scrape` gateway so every scraping operation goes through
//! an optional Redis (or in-memory) cache keyed on the operation and its
//! arguments.

pub mod cache;
pub mod cache_key;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod lookup;
pub mod screener;
pub mod validation;

pub use mboum_scrape;
pub use mboum_scrape::types;

pub use cache::{CacheError, CacheStore, MemoryCache, RedisCache};
pub use cache_key::{CacheArgs, KeyError};
pub use client::{CachedClient, CountryStock};
pub use config::{CacheTtls, Settings};
pub use coordinator::CacheCoordinator;
pub use error::Error;
pub use lookup::{LookupError, LookupTables};
pub use screener::{ScreenerCriteria, ScreenerFilter, SCREENER_FILTERS};
