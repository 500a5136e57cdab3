//! JSON envelopes returned by every endpoint.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mboum_lib::Error;
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    status_code: u16,
    message: &'a str,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
}

/// Successful response: `{status_code, message, data}`.
pub struct ApiResponse<T> {
    message: String,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_message("success", data)
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            status_code: StatusCode::OK.as_u16(),
            message: &self.message,
            data: Some(self.data),
            trace_id: None,
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Failed request.
///
/// Rendered as a bare status plus a response extension; the trace-id
/// middleware turns it into the full error envelope once the trace id is
/// known (see [`ApiError::into_envelope`]).
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `{status_code, message, data: null, trace_id}`.
    pub fn into_envelope(self, trace_id: &str) -> Response {
        let body = Envelope::<()> {
            status_code: self.status.as_u16(),
            message: &self.message,
            data: None,
            trace_id: Some(trace_id),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::RequestFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::DataNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Scraping(msg) => {
                tracing::error!("Scraping failed: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}
