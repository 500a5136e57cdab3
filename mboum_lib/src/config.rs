//! Runtime settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use mboum_scrape::DEFAULT_BASE_URL;

use crate::coordinator::DEFAULT_NAMESPACE;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_TABLES_DIR: &str = "./tables";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Process-wide settings. Every field has a default so the service starts
/// with an empty environment (and without a cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub http_timeout: Duration,
    pub tables_dir: PathBuf,
    /// `None` disables caching.
    pub redis_url: Option<String>,
    pub cache_namespace: String,
    pub ttls: CacheTtls,
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            tables_dir: PathBuf::from(DEFAULT_TABLES_DIR),
            redis_url: None,
            cache_namespace: DEFAULT_NAMESPACE.to_string(),
            ttls: CacheTtls::default(),
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let ttls = match non_empty("MBOUM_CACHE_TTL_SECS").and_then(|v| v.parse::<u64>().ok()) {
            Some(secs) => CacheTtls::uniform(Duration::from_secs(secs)),
            None => CacheTtls::default(),
        };
        Self {
            base_url: non_empty("MBOUM_BASE_URL").unwrap_or(defaults.base_url),
            http_timeout: Duration::from_secs(env_u64(
                &var,
                "MBOUM_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            tables_dir: non_empty("MBOUM_TABLES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.tables_dir),
            redis_url: non_empty("REDIS_URL"),
            cache_namespace: non_empty("MBOUM_CACHE_NAMESPACE").unwrap_or(defaults.cache_namespace),
            ttls,
            bind: non_empty("MBOUM_BIND").unwrap_or(defaults.bind),
        }
    }
}

/// Time-to-live for each cached operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub description: Duration,
    pub stats: Duration,
    pub stock_news: Duration,
    pub latest_news: Duration,
    pub analyst_ratings: Duration,
    pub insider_trades: Duration,
    pub market_insider_trades: Duration,
    pub screener_options: Duration,
    pub screener_results: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            description: Duration::from_secs(86_400),
            stats: Duration::from_secs(300),
            stock_news: Duration::from_secs(600),
            latest_news: Duration::from_secs(300),
            analyst_ratings: Duration::from_secs(3_600),
            insider_trades: Duration::from_secs(1_800),
            market_insider_trades: Duration::from_secs(900),
            screener_options: Duration::from_secs(86_400),
            screener_results: Duration::from_secs(900),
        }
    }
}

impl CacheTtls {
    /// The same TTL for every operation. Zero disables writes.
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            description: ttl,
            stats: ttl,
            stock_news: ttl,
            latest_news: ttl,
            analyst_ratings: ttl,
            insider_trades: ttl,
            market_insider_trades: ttl,
            screener_options: ttl,
            screener_results: ttl,
        }
    }
}

fn env_u64(var: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    var(key)
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
