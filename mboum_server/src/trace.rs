//! Per-request trace ids.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::response::ApiError;

pub const TRACE_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

const MAX_TRACE_ID_LEN: usize = 128;

/// Opaque id of the current request, taken from `x-trace-id` or generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    fn from_parts(parts: &Parts) -> Self {
        parts
            .headers
            .get(&TRACE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_TRACE_ID_LEN)
            .map(|v| TraceId(v.to_string()))
            .unwrap_or_else(|| TraceId(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Assigns the request's trace id, renders [`ApiError`]s into the error
/// envelope, and echoes the id in the `x-trace-id` response header.
pub async fn propagate_trace_id(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let trace_id = TraceId::from_parts(&parts);
    parts.extensions.insert(trace_id.clone());

    let mut response = next.run(Request::from_parts(parts, body)).await;

    if let Some(error) = response.extensions_mut().remove::<ApiError>() {
        response = error.into_envelope(trace_id.as_str());
    }
    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_HEADER, value);
    }
    response
}
