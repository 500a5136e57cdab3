//! HTTP routes.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Router};
use mboum_lib::types::{
    AnalystRating, Description, InsiderTrade, MarketInsiderTrade, MarketNews, ScreenerOption,
    ScreenerPage, ScreenerRow, ScreenerStock, Stats, StockNews,
};
use mboum_lib::{CachedClient, CountryStock, ScreenerCriteria};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::response::{ApiError, ApiResponse};
use crate::trace::{propagate_trace_id, TraceId};

const BANNER: &str = "Hello Mboum Finance API";

type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<CachedClient>,
}

impl AppState {
    pub fn new(client: CachedClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Path extractor whose rejection renders the 400 error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct Path<T>(T);

/// Query extractor whose rejection renders the 400 error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct Query<T>(T);

#[derive(Debug, Deserialize)]
struct Paging {
    page: Option<i64>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/desc/:symbol", get(description))
        .route("/stats/:symbol", get(stats))
        .route("/stock-news/:symbol", get(stock_news))
        .route("/analyst-ratings/:symbol", get(analyst_ratings))
        .route("/insider-trades/:symbol", get(insider_trades))
        .route("/latest-news", get(latest_news))
        .route("/all-insider-trades", get(all_insider_trades))
        .route("/screener-options", get(screener_options))
        .route("/multiple-screener", get(multiple_screener))
        .route("/oversold/:country", get(oversold))
        .route("/overbought/:country", get(overbought))
        .route("/upcoming-earnings/:country", get(upcoming_earnings))
        .route("/countries", get(countries))
        .route("/stocks/:country", get(stocks_by_country))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let trace_id = request
                    .extensions()
                    .get::<TraceId>()
                    .map(TraceId::as_str)
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    trace_id = %trace_id,
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .layer(middleware::from_fn(propagate_trace_id))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct Banner {
    service: &'static str,
    version: &'static str,
}

async fn root() -> ApiResponse<Banner> {
    ApiResponse::with_message(
        BANNER,
        Banner {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "route not found")
}

async fn description(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Description> {
    Ok(ApiResponse::ok(state.client.description(&symbol).await?))
}

async fn stats(State(state): State<AppState>, Path(symbol): Path<String>) -> ApiResult<Stats> {
    Ok(ApiResponse::ok(state.client.stats(&symbol).await?))
}

async fn stock_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Vec<StockNews>> {
    Ok(ApiResponse::ok(state.client.stock_news(&symbol).await?))
}

async fn analyst_ratings(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Vec<AnalystRating>> {
    Ok(ApiResponse::ok(state.client.analyst_ratings(&symbol).await?))
}

async fn insider_trades(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Vec<InsiderTrade>> {
    Ok(ApiResponse::ok(state.client.insider_trades(&symbol).await?))
}

async fn latest_news(State(state): State<AppState>) -> ApiResult<Vec<MarketNews>> {
    Ok(ApiResponse::ok(state.client.market_news().await?))
}

async fn all_insider_trades(State(state): State<AppState>) -> ApiResult<Vec<MarketInsiderTrade>> {
    Ok(ApiResponse::ok(state.client.market_insider_trades().await?))
}

async fn screener_options(State(state): State<AppState>) -> ApiResult<Vec<ScreenerOption>> {
    Ok(ApiResponse::ok(state.client.screener_options().await?))
}

async fn multiple_screener(
    State(state): State<AppState>,
    Query(criteria): Query<ScreenerCriteria>,
    Query(paging): Query<Paging>,
) -> ApiResult<ScreenerPage<ScreenerRow>> {
    let page = paging.page.unwrap_or(1);
    Ok(ApiResponse::ok(
        state.client.multiple_screener(&criteria, page).await?,
    ))
}

async fn oversold(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> ApiResult<Vec<ScreenerStock>> {
    Ok(ApiResponse::ok(state.client.oversold(&country).await?))
}

async fn overbought(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> ApiResult<Vec<ScreenerStock>> {
    Ok(ApiResponse::ok(state.client.overbought(&country).await?))
}

async fn upcoming_earnings(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> ApiResult<Vec<ScreenerStock>> {
    Ok(ApiResponse::ok(state.client.upcoming_earnings(&country).await?))
}

async fn countries(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::ok(state.client.countries()?))
}

async fn stocks_by_country(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> ApiResult<Vec<CountryStock>> {
    Ok(ApiResponse::ok(state.client.stocks_by_country(&country)?))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
