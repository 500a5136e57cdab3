use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mboum_lib::mboum_scrape::Client;
use mboum_lib::{CacheCoordinator, CacheTtls, LookupTables, MemoryCache};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const QUOTE_HTML: &str = include_str!("../../mboum_scrape/tests/fixtures/quote.html");
const SCREENER_HTML: &str = include_str!("../../mboum_scrape/tests/fixtures/screener.html");

fn test_app(server: &MockServer) -> Router {
    let inner = Client::with_base_url(&server.uri()).unwrap();
    let coordinator = CacheCoordinator::new(Arc::new(MemoryCache::new()), "test");
    let tables = LookupTables::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../tables"));
    let client = CachedClient::new(inner, coordinator, tables, CacheTtls::default());
    app(AppState::new(client))
}

async fn send(app: Router, uri: &str, trace_id: Option<&str>) -> (StatusCode, Option<String>, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(id) = trace_id {
        request = request.header("x-trace-id", id);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let header = response
        .headers()
        .get("x-trace-id")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, header, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn root_returns_banner() {
    let server = MockServer::start().await;
    let (status, trace, body) = send(test_app(&server), "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["message"], "Hello Mboum Finance API");
    assert!(trace.is_some());
}

#[tokio::test]
async fn description_success_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let (status, trace, body) = send(test_app(&server), "/desc/aapl", Some("req-42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trace.as_deref(), Some("req-42"));
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["name"], "Apple Inc.");
    assert!(body.get("trace_id").is_none());
}

#[tokio::test]
async fn stats_are_flattened() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_HTML))
        .mount(&server)
        .await;

    let (status, _, body) = send(test_app(&server), "/stats/AAPL", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], "AAPL");
    assert_eq!(body["data"]["marketCap"], "3.45T");
}

#[tokio::test]
async fn invalid_symbol_is_bad_request() {
    let server = MockServer::start().await;
    let (status, trace, body) = send(test_app(&server), "/desc/AA$PL", Some("req-7")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(trace.as_deref(), Some("req-7"));
    assert_eq!(body["status_code"], 400);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["trace_id"], "req-7");
}

#[tokio::test]
async fn upstream_failure_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, trace, body) = send(test_app(&server), "/latest-news", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status_code"], 503);
    assert_eq!(body["data"], Value::Null);
    // Generated id is echoed in both places.
    assert_eq!(body["trace_id"].as_str(), trace.as_deref());
}

#[tokio::test]
async fn missing_section_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let (status, _, body) = send(test_app(&server), "/all-insider-trades", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status_code"], 404);
}

#[tokio::test]
async fn multiple_screener_reads_criteria_and_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screener/2"))
        .and(query_param("cntry", "united-states"))
        .and(query_param("volume", "vol_o_100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCREENER_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _, body) = send(
        test_app(&server),
        "/multiple-screener?country=United%20States&volume=Over%20100K&page=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["totalPages"], 3);
    assert_eq!(body["data"]["data"][0]["ticker"], "AAPL");
    assert_eq!(body["data"]["data"][0]["marketCap"], "3.45T");
}

#[tokio::test]
async fn malformed_page_is_bad_request() {
    let server = MockServer::start().await;
    let (status, _, body) = send(test_app(&server), "/multiple-screener?page=two", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status_code"], 400);
    assert!(body["trace_id"].is_string());
}

#[tokio::test]
async fn unknown_country_is_bad_request() {
    let server = MockServer::start().await;
    let (status, _, body) = send(test_app(&server), "/oversold/Atlantis", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn upcoming_earnings_uses_preset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screener"))
        .and(query_param("cntry", "japan"))
        .and(query_param("earnings", "earnings_tw"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCREENER_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _, body) = send(test_app(&server), "/upcoming-earnings/Japan", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn countries_and_stocks() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let (status, _, body) = send(app.clone(), "/countries", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "United States"));

    let (status, _, body) = send(app.clone(), "/stocks/united%20states", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["ticker"], "AAPL");
    assert!(body["data"][0].get("country").is_none());

    let (status, _, _) = send(app, "/stocks/Atlantis", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let server = MockServer::start().await;
    let (status, _, body) = send(test_app(&server), "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "route not found");
    assert_eq!(body["data"], Value::Null);
}
