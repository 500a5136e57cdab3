//! Error types for the fetch gateway and page extractors.

/// Errors that can occur when fetching or extracting an upstream page.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The HTTP request could not be completed (timeout, connection error,
    /// or non-success status).
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// Anything else that went wrong around the request, such as an invalid
    /// URL or an unreadable response body.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
    /// The page was fetched but does not contain the expected data.
    #[error("No data found: {0}")]
    NotFound(String),
    /// The page has an unexpected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}
