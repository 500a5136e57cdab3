//! Caller-visible error taxonomy for the library layer.

use std::fmt;

use crate::lookup::LookupError;

/// The four failure kinds a caller can observe.
///
/// Cache-store failures never appear here; they are downgraded to cache
/// misses or logged and ignored by the coordinator.
#[derive(Debug)]
pub enum Error {
    /// The upstream site could not be reached or returned a non-success status.
    RequestFailed(String),
    /// The upstream page or a local table has no data for the request.
    DataNotFound(String),
    /// A caller-supplied parameter failed validation.
    InvalidInput(String),
    /// Parse failures, unexpected page shapes, and any other internal fault.
    Scraping(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            Self::DataNotFound(msg) => write!(f, "Data not found: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Scraping(msg) => write!(f, "Scraping error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<mboum_scrape::Error> for Error {
    fn from(e: mboum_scrape::Error) -> Self {
        match e {
            mboum_scrape::Error::RequestFailed(msg) => Self::RequestFailed(msg),
            mboum_scrape::Error::NotFound(msg) => Self::DataNotFound(msg),
            mboum_scrape::Error::Parse(msg) | mboum_scrape::Error::Unexpected(msg) => {
                Self::Scraping(msg)
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Scraping(format!("serialization failed: {}", e))
    }
}

impl From<LookupError> for Error {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::Missing(_) => Self::DataNotFound(e.to_string()),
            LookupError::InvalidName(_) => Self::InvalidInput(e.to_string()),
            LookupError::Csv { .. } => Self::Scraping(e.to_string()),
        }
    }
}
