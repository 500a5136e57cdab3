use regex::Regex;
use scraper::{ElementRef, Html};

use super::{first_text, selector, text_of};
use crate::types::{ScreenerOption, ScreenerPage, ScreenerRow, ScreenerStock};
use crate::Error;

const RESULT_ROWS: &str =
    "table.table.table-striped.table-hover.table-sm.table-bordered.analytic tbody tr";
const RESULT_TABLE: &str = "table.table.table-striped.table-hover.table-sm.table-bordered.analytic";

/// Every option of every `<select>` on the `/screener` page.
pub fn screener_options(html: &str) -> Result<Vec<ScreenerOption>, Error> {
    let doc = Html::parse_document(html);
    let options: Vec<_> = doc
        .root_element()
        .select(&selector("select option")?)
        .map(|option| ScreenerOption {
            name: text_of(&option),
            value: option.value().attr("value").unwrap_or_default().to_string(),
        })
        .collect();
    if options.is_empty() {
        return Err(Error::NotFound("screener filter options".into()));
    }
    Ok(options)
}

/// One page of the screener overview table, with the total page count.
pub fn screener_page(html: &str, page: i64) -> Result<ScreenerPage<ScreenerRow>, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let rows = result_rows(&root)?;

    let link = selector("a")?;
    let change = selector("span")?;
    let data = rows
        .iter()
        .filter(|cols| cols.len() >= 9)
        .map(|cols| ScreenerRow {
            ticker: first_text(&cols[0], &link),
            company: text_of(&cols[1]),
            industry: text_of(&cols[2]),
            sector: text_of(&cols[3]),
            country: text_of(&cols[4]),
            market_cap: text_of(&cols[5]),
            price: text_of(&cols[6]),
            change: first_text(&cols[7], &change),
            volume: text_of(&cols[8]),
        })
        .collect();

    Ok(ScreenerPage {
        page,
        total_pages: total_pages(&root)?.unwrap_or(1),
        data,
    })
}

/// Ticker, company and classification columns of a screener result page.
pub fn screener_stocks(html: &str) -> Result<Vec<ScreenerStock>, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let link = selector("a")?;
    let stocks = result_rows(&root)?
        .iter()
        .filter(|cols| cols.len() >= 5)
        .map(|cols| ScreenerStock {
            ticker: first_text(&cols[0], &link),
            company: text_of(&cols[1]),
            industry: text_of(&cols[2]),
            sector: text_of(&cols[3]),
            country: text_of(&cols[4]),
        })
        .collect();
    Ok(stocks)
}

fn result_rows<'a>(root: &ElementRef<'a>) -> Result<Vec<Vec<ElementRef<'a>>>, Error> {
    if root.select(&selector(RESULT_TABLE)?).next().is_none() {
        return Err(Error::NotFound("screener results table".into()));
    }
    let cell = selector("td")?;
    Ok(root
        .select(&selector(RESULT_ROWS)?)
        .map(|row| row.select(&cell).collect())
        .collect())
}

/// Reads `N` from the "Page X of N" pager label, if the page has one.
fn total_pages(root: &ElementRef) -> Result<Option<i64>, Error> {
    let pager = Regex::new(r"Page\s+\d+\s*(?:/|of)\s*(\d+)")
        .map_err(|e| Error::Parse(format!("regex compile error: {}", e)))?;
    for span in root.select(&selector("span")?) {
        let text = text_of(&span);
        if let Some(caps) = pager.captures(&text) {
            return caps[1]
                .parse::<i64>()
                .map(Some)
                .map_err(|e| Error::Parse(format!("invalid page count '{}': {}", &caps[1], e)));
        }
    }
    Ok(None)
}
