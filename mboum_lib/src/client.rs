//! Caching façade over the Mboum gateway.

use std::future::Future;
use std::time::Duration;

use mboum_scrape::types::{
    AnalystRating, Description, InsiderTrade, MarketInsiderTrade, MarketNews, ScreenerOption,
    ScreenerPage, ScreenerRow, ScreenerStock, Stats, StockNews,
};
use mboum_scrape::{Client, ScreenerQuery};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache_key::CacheArgs;
use crate::config::{CacheTtls, Settings};
use crate::coordinator::CacheCoordinator;
use crate::error::Error;
use crate::lookup::{LookupTables, COUNTRIES};
use crate::screener::ScreenerCriteria;
use crate::validation;

/// A stock listed for a country.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CountryStock {
    pub ticker: String,
    pub company: String,
}

/// Gateway wrapper that serves every scraping operation through the cache.
///
/// Each operation validates its input, then asks the coordinator for the
/// stored records; on a miss it performs exactly one upstream fetch and
/// extracts the records, which the coordinator stores as JSON.
#[derive(Clone)]
pub struct CachedClient {
    inner: Client,
    coordinator: CacheCoordinator,
    tables: LookupTables,
    ttls: CacheTtls,
}

impl CachedClient {
    pub fn new(
        inner: Client,
        coordinator: CacheCoordinator,
        tables: LookupTables,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            inner,
            coordinator,
            tables,
            ttls,
        }
    }

    /// Builds the gateway and lookup tables from `settings`.
    pub fn from_settings(settings: &Settings, coordinator: CacheCoordinator) -> Result<Self, Error> {
        let inner = Client::with_config(&settings.base_url, settings.http_timeout)?;
        Ok(Self::new(
            inner,
            coordinator,
            LookupTables::new(&settings.tables_dir),
            settings.ttls,
        ))
    }

    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    pub fn coordinator(&self) -> &CacheCoordinator {
        &self.coordinator
    }

    async fn cached<T, F, Fut>(
        &self,
        operation_id: &str,
        args: CacheArgs,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, mboum_scrape::Error>>,
    {
        Ok(self
            .coordinator
            .execute_cached_json(operation_id, &args, ttl, fetch)
            .await?)
    }

    pub async fn description(&self, symbol: &str) -> Result<Description, Error> {
        let symbol = validation::validate_symbol(symbol)?;
        let args = CacheArgs::new().arg(&symbol);
        self.cached("description", args, self.ttls.description, || {
            self.inner.get_description(&symbol)
        })
        .await
    }

    pub async fn stats(&self, symbol: &str) -> Result<Stats, Error> {
        let symbol = validation::validate_symbol(symbol)?;
        let args = CacheArgs::new().arg(&symbol);
        self.cached("stats", args, self.ttls.stats, || self.inner.get_stats(&symbol))
            .await
    }

    pub async fn stock_news(&self, symbol: &str) -> Result<Vec<StockNews>, Error> {
        let symbol = validation::validate_symbol(symbol)?;
        let args = CacheArgs::new().arg(&symbol);
        self.cached("stock_news", args, self.ttls.stock_news, || {
            self.inner.get_stock_news(&symbol)
        })
        .await
    }

    pub async fn analyst_ratings(&self, symbol: &str) -> Result<Vec<AnalystRating>, Error> {
        let symbol = validation::validate_symbol(symbol)?;
        let args = CacheArgs::new().arg(&symbol);
        self.cached("analyst_ratings", args, self.ttls.analyst_ratings, || {
            self.inner.get_analyst_ratings(&symbol)
        })
        .await
    }

    pub async fn insider_trades(&self, symbol: &str) -> Result<Vec<InsiderTrade>, Error> {
        let symbol = validation::validate_symbol(symbol)?;
        let args = CacheArgs::new().arg(&symbol);
        self.cached("insider_trades", args, self.ttls.insider_trades, || {
            self.inner.get_insider_trades(&symbol)
        })
        .await
    }

    /// Latest market-wide headlines.
    pub async fn market_news(&self) -> Result<Vec<MarketNews>, Error> {
        self.cached("latest_news", CacheArgs::new(), self.ttls.latest_news, || {
            self.inner.get_market_news()
        })
        .await
    }

    /// Insider transactions across all companies.
    pub async fn market_insider_trades(&self) -> Result<Vec<MarketInsiderTrade>, Error> {
        self.cached(
            "market_insider_trades",
            CacheArgs::new(),
            self.ttls.market_insider_trades,
            || self.inner.get_market_insider_trades(),
        )
        .await
    }

    pub async fn screener_options(&self) -> Result<Vec<ScreenerOption>, Error> {
        self.cached(
            "screener_options",
            CacheArgs::new(),
            self.ttls.screener_options,
            || self.inner.get_screener_options(),
        )
        .await
    }

    /// One page of screener results for `criteria`.
    pub async fn multiple_screener(
        &self,
        criteria: &ScreenerCriteria,
        page: i64,
    ) -> Result<ScreenerPage<ScreenerRow>, Error> {
        let page = validation::validate_page(page)?;
        let query = criteria.build_query(&self.tables, page)?;
        let args = CacheArgs::new().arg(criteria).named("page", &page);
        self.cached("multiple_screener", args, self.ttls.screener_results, || {
            self.inner.get_screener_page(&query)
        })
        .await
    }

    pub async fn oversold(&self, country: &str) -> Result<Vec<ScreenerStock>, Error> {
        let code = self.country_code(country)?;
        self.preset("oversold", ScreenerQuery::oversold(&code), &code)
            .await
    }

    pub async fn overbought(&self, country: &str) -> Result<Vec<ScreenerStock>, Error> {
        let code = self.country_code(country)?;
        self.preset("overbought", ScreenerQuery::overbought(&code), &code)
            .await
    }

    pub async fn upcoming_earnings(&self, country: &str) -> Result<Vec<ScreenerStock>, Error> {
        let code = self.country_code(country)?;
        self.preset(
            "upcoming_earnings",
            ScreenerQuery::upcoming_earnings(&code),
            &code,
        )
        .await
    }

    async fn preset(
        &self,
        operation_id: &str,
        query: ScreenerQuery,
        country_code: &str,
    ) -> Result<Vec<ScreenerStock>, Error> {
        let args = CacheArgs::new().arg(country_code);
        self.cached(operation_id, args, self.ttls.screener_results, || {
            self.inner.get_screener_stocks(&query)
        })
        .await
    }

    fn country_code(&self, country: &str) -> Result<String, Error> {
        let country = validation::validate_country(country)?;
        self.tables.require(COUNTRIES, &country)
    }

    /// Names of every supported country.
    pub fn countries(&self) -> Result<Vec<String>, Error> {
        Ok(self.tables.names(COUNTRIES)?)
    }

    /// Stocks listed for `country`, read from the local stock tables.
    pub fn stocks_by_country(&self, country: &str) -> Result<Vec<CountryStock>, Error> {
        let slug = validation::country_slug(country)?;
        let table = format!("stocks/{}.csv", slug);
        Ok(self.tables.read_rows(&table)?)
    }
}
