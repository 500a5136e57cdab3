use scraper::{ElementRef, Html};

use super::{first_attr, first_text, selector, text_of};
use crate::types::{MarketNews, StockNews};
use crate::Error;

/// Headlines from the news card of a `/quote/{symbol}` page.
pub fn stock_news(html: &str) -> Result<Vec<StockNews>, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let table = root
        .select(&selector("div.col-8 div.card-body table")?)
        .next()
        .ok_or_else(|| Error::NotFound("stock news table".into()))?;

    let time = selector("td:first-child")?;
    let link = selector("td a")?;
    let news = table
        .select(&selector("tr")?)
        .filter(|row| row.select(&link).next().is_some())
        .map(|row| StockNews {
            time: first_text(&row, &time),
            headline: first_text(&row, &link),
            link: first_attr(&row, &link, "href"),
        })
        .collect();
    Ok(news)
}

/// Headlines from every table on the `/news` page.
pub fn market_news(html: &str) -> Result<Vec<MarketNews>, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    if root.select(&selector("table")?).next().is_none() {
        return Err(Error::NotFound("news table".into()));
    }

    let cell = selector("td")?;
    let link = selector("td a")?;
    let news = root
        .select(&selector("table tr")?)
        .filter_map(|row| {
            let time = row.select(&cell).next()?;
            let headline = row.select(&link).next()?;
            let authors = headline
                .next_siblings()
                .find_map(ElementRef::wrap)
                .map(|e| text_of(&e))
                .unwrap_or_default();
            Some(MarketNews {
                time: text_of(&time),
                headline: text_of(&headline),
                authors,
            })
        })
        .collect();
    Ok(news)
}
