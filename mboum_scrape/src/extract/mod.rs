//! Page extractors: pure functions from raw HTML to records.
//!
//! Each extractor returns [`Error::NotFound`] when the section it reads is
//! absent from the page and [`Error::Parse`] when the section is present but
//! malformed. A present section with no rows yields an empty list.

mod insider;
mod news;
mod quote;
mod screener;

pub use self::insider::{insider_trades, market_insider_trades};
pub use self::news::{market_news, stock_news};
pub use self::quote::{analyst_ratings, description, stats};
pub use self::screener::{screener_options, screener_page, screener_stocks};

use scraper::{ElementRef, Selector};

use crate::Error;

pub(crate) fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("invalid selector '{}': {:?}", css, e)))
}

/// Concatenated, trimmed text content of an element and its descendants.
pub(crate) fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first descendant matching `selector`, or an empty string.
pub(crate) fn first_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| text_of(&e))
        .unwrap_or_default()
}

/// Attribute of the first descendant matching `selector`, or an empty string.
pub(crate) fn first_attr(element: &ElementRef, selector: &Selector, attr: &str) -> String {
    element
        .select(selector)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}
