//! HTTP gateway, record types and page extractors for the Mboum website.
//!
//! [`Client`] fetches raw HTML from a single upstream base address; the
//! [`extract`] functions turn that HTML into the records in [`types`].

mod client;
mod errors;
pub mod extract;
mod query;
pub mod types;
pub mod user_agent;
pub use self::client::{Client, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use self::errors::Error;
pub use self::query::{Query, ScreenerQuery, SortDirection};
