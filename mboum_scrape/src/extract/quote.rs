use std::collections::BTreeMap;

use scraper::Html;

use super::{first_text, selector, text_of};
use crate::types::{AnalystRating, Description, Stats};
use crate::Error;

/// Company name and summary from a `/quote/{symbol}` page.
pub fn description(html: &str) -> Result<Description, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let header = root
        .select(&selector(".card-header")?)
        .next()
        .ok_or_else(|| Error::NotFound("company description".into()))?;
    let name = text_of(&header).replace("About ", "").trim().to_string();
    let description = first_text(&root, &selector(".card-text")?);
    Ok(Description { name, description })
}

const RESERVED_STAT_KEYS: [&str; 2] = ["symbol", "name"];

/// Key statistics from a `/quote/{symbol}` page.
pub fn stats(html: &str) -> Result<Stats, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let links: Vec<_> = root.select(&selector("div.text-center.p-1 > a")?).collect();
    let bold = selector("b")?;
    let symbol = links
        .first()
        .and_then(|a| a.select(&bold).next())
        .map(|b| text_of(&b))
        .ok_or_else(|| Error::NotFound("quote header".into()))?;
    let name = links
        .get(1)
        .map(text_of)
        .ok_or_else(|| Error::NotFound("quote company name".into()))?;

    let cell = selector("td")?;
    let mut fields = BTreeMap::new();
    for row in root.select(&selector("tr.d-flex")?) {
        let cells: Vec<_> = row.select(&cell).collect();
        for pair in cells.chunks(2) {
            let label = text_of(&pair[0]);
            let value = pair.get(1).ok_or_else(|| {
                Error::Parse(format!("statistic '{}' has no value cell", label))
            })?;
            let value = value
                .select(&bold)
                .next()
                .map(|b| text_of(&b))
                .unwrap_or_else(|| text_of(value));
            let key = to_camel_case(&label);
            // The header already supplies these and they share the flattened object.
            if RESERVED_STAT_KEYS.contains(&key.as_str()) {
                tracing::debug!("Skipping statistic '{}' that shadows the quote header", label);
                continue;
            }
            fields.insert(key, value);
        }
    }

    Ok(Stats {
        symbol,
        name,
        fields,
    })
}

/// Rows of the "Analyst Ratings" card on a `/quote/{symbol}` page.
pub fn analyst_ratings(html: &str) -> Result<Vec<AnalystRating>, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let card = root
        .select(&selector("div.card")?)
        .find(|card| text_of(card).contains("Analyst Ratings"))
        .ok_or_else(|| Error::NotFound("analyst ratings card".into()))?;
    let table = card
        .select(&selector("table")?)
        .next()
        .ok_or_else(|| Error::NotFound("analyst ratings table".into()))?;

    let cell = selector("td")?;
    let ratings = table
        .select(&selector("tr")?)
        .filter_map(|row| {
            let cols: Vec<_> = row.select(&cell).collect();
            match cols.as_slice() {
                [analyst, rating, date] => Some(AnalystRating {
                    analyst: text_of(analyst),
                    rating: text_of(rating),
                    date: text_of(date),
                }),
                _ => None,
            }
        })
        .collect();
    Ok(ratings)
}

fn to_camel_case(text: &str) -> String {
    let mut words = text.split_whitespace();
    let mut out = match words.next() {
        Some(first) => first.to_lowercase(),
        None => return String::new(),
    };
    for word in words {
        let mut chars = word.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_labels() {
        assert_eq!(to_camel_case("Market Cap"), "marketCap");
        assert_eq!(to_camel_case("  EPS  next Y "), "epsNextY");
        assert_eq!(to_camel_case("Beta"), "beta");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn stats_requires_quote_header() {
        let err = stats("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn stats_label_without_value_is_parse_error() {
        let html = r#"<div class="text-center p-1"><a><b>AAPL</b></a><a>Apple Inc.</a></div>
            <table><tr class="d-flex"><td>Beta</td></tr></table>"#;
        assert!(matches!(stats(html), Err(Error::Parse(_))));
    }

    #[test]
    fn stats_labels_never_shadow_header_fields() {
        let html = r#"<div class="text-center p-1"><a><b>AAPL</b></a><a>Apple Inc.</a></div>
            <table><tr class="d-flex"><td>Name</td><td><b>Apple</b></td><td>Symbol</td><td>X</td></tr>
            <tr class="d-flex"><td>Beta</td><td>1.24</td></tr></table>"#;
        let stats = stats(html).unwrap();
        assert_eq!(stats.name, "Apple Inc.");
        assert_eq!(stats.symbol, "AAPL");
        assert_eq!(stats.fields.len(), 1);
        assert_eq!(stats.fields.get("beta").map(String::as_str), Some("1.24"));
    }
}
