//! HTTP gateway for the Mboum website.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

use crate::{
    extract,
    query::{Query, ScreenerQuery},
    types::{
        AnalystRating, Description, InsiderTrade, MarketInsiderTrade, MarketNews, ScreenerOption,
        ScreenerPage, ScreenerRow, ScreenerStock, Stats, StockNews,
    },
    user_agent::get_user_agent,
    Error,
};

/// Production base address of the upstream site.
pub const DEFAULT_BASE_URL: &str = "https://mboum.com";

/// Upstream request timeout used unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP gateway bound to one upstream base address.
///
/// Holds a single pooled `reqwest::Client`, so one `Client` can be shared by
/// every in-flight request. Each call makes exactly one attempt.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client pointing at the production site with the default timeout.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::with_config(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom base URL and upstream timeout.
    pub fn with_config(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Unexpected(format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base address this client is bound to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_url(&self, path: &str, query: Option<&impl Query>) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::Unexpected(format!("invalid URL for path '{}': {}", path, e))
        })?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    /// Fetches the HTML at `path` relative to the base address.
    pub async fn get(&self, path: &str) -> Result<String, Error> {
        let url = self.get_url(path, None::<&ScreenerQuery>)?;
        self.fetch_html(url).await
    }

    async fn fetch_html(&self, url: Url) -> Result<String, Error> {
        tracing::debug!("GET {}", url);
        let resp = self
            .http
            .get(url.clone())
            .header(USER_AGENT, get_user_agent())
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet = truncate_body(&body);
            tracing::error!("Request to {} failed with status {}: {}", url, status, snippet);
            return Err(Error::RequestFailed(format!(
                "{} returned status {}",
                url,
                status.as_u16()
            )));
        }

        resp.text().await.map_err(|e| transport_error(&url, e))
    }

    /// Company description from the quote page.
    pub async fn get_description(&self, symbol: &str) -> Result<Description, Error> {
        let html = self.get(&quote_path(symbol)).await?;
        extract::description(&html)
    }

    /// Key statistics from the quote page.
    pub async fn get_stats(&self, symbol: &str) -> Result<Stats, Error> {
        let html = self.get(&quote_path(symbol)).await?;
        extract::stats(&html)
    }

    /// News headlines from the quote page.
    pub async fn get_stock_news(&self, symbol: &str) -> Result<Vec<StockNews>, Error> {
        let html = self.get(&quote_path(symbol)).await?;
        extract::stock_news(&html)
    }

    /// Analyst ratings from the quote page.
    pub async fn get_analyst_ratings(&self, symbol: &str) -> Result<Vec<AnalystRating>, Error> {
        let html = self.get(&quote_path(symbol)).await?;
        extract::analyst_ratings(&html)
    }

    /// Insider transactions from the quote page.
    pub async fn get_insider_trades(&self, symbol: &str) -> Result<Vec<InsiderTrade>, Error> {
        let html = self.get(&quote_path(symbol)).await?;
        extract::insider_trades(&html)
    }

    /// Latest market headlines from `/news`.
    pub async fn get_market_news(&self) -> Result<Vec<MarketNews>, Error> {
        let html = self.get("/news").await?;
        extract::market_news(&html)
    }

    /// Market-wide insider transactions from the home page.
    pub async fn get_market_insider_trades(&self) -> Result<Vec<MarketInsiderTrade>, Error> {
        let html = self.get("/").await?;
        extract::market_insider_trades(&html)
    }

    /// Filter options offered by the screener form.
    pub async fn get_screener_options(&self) -> Result<Vec<ScreenerOption>, Error> {
        let html = self.get("/screener").await?;
        extract::screener_options(&html)
    }

    /// One page of screener results for `query`.
    pub async fn get_screener_page(
        &self,
        query: &ScreenerQuery,
    ) -> Result<ScreenerPage<ScreenerRow>, Error> {
        let url = self.get_url(&query.path(), Some(query))?;
        let html = self.fetch_html(url).await?;
        extract::screener_page(&html, query.page().unwrap_or(1))
    }

    /// Stocks listed for `query`, without the market data columns.
    pub async fn get_screener_stocks(
        &self,
        query: &ScreenerQuery,
    ) -> Result<Vec<ScreenerStock>, Error> {
        let url = self.get_url(&query.path(), Some(query))?;
        let html = self.fetch_html(url).await?;
        extract::screener_stocks(&html)
    }
}

fn quote_path(symbol: &str) -> String {
    format!("/quote/{}", symbol)
}

fn transport_error(url: &Url, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        tracing::error!("Request to {} timed out: {}", url, e);
        Error::RequestFailed(format!("request to {} timed out", url))
    } else if e.is_connect() || e.is_request() {
        tracing::error!("Request error for {}: {}", url, e);
        Error::RequestFailed(format!("request to {} failed: {}", url, e))
    } else {
        tracing::error!("Unhandled error during request to {}: {}", url, e);
        Error::Unexpected(format!("request to {} failed unexpectedly: {}", url, e))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    match body.char_indices().nth(MAX) {
        None => body.to_string(),
        Some((idx, _)) => format!("{}...[truncated]", &body[..idx]),
    }
}
