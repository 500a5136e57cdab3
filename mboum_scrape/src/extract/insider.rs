use scraper::Html;

use super::{first_attr, first_text, selector, text_of};
use crate::types::{InsiderTrade, MarketInsiderTrade};
use crate::Error;

/// Insider transactions table of a `/quote/{symbol}` page.
pub fn insider_trades(html: &str) -> Result<Vec<InsiderTrade>, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    if root.select(&selector("table.table-sm")?).next().is_none() {
        return Err(Error::NotFound("insider trades table".into()));
    }

    let insider = selector("td:nth-child(1)")?;
    let relationship = selector("td:nth-child(2) span.home-insider-desktop")?;
    let date = selector("td:nth-child(3)")?;
    let transactions = selector("td:nth-child(4)")?;
    let cost = selector("td:nth-child(5)")?;
    let shares = selector("td:nth-child(6)")?;
    let value = selector("td:nth-child(7)")?;
    let share_own = selector("td:nth-child(8)")?;
    let sec_form4 = selector("td:nth-child(9) a")?;

    let trades = root
        .select(&selector("table.table-sm tbody tr")?)
        .map(|row| InsiderTrade {
            insider: first_text(&row, &insider),
            relationship: first_text(&row, &relationship),
            date: first_text(&row, &date),
            transactions: first_text(&row, &transactions),
            cost: first_text(&row, &cost),
            shares: first_text(&row, &shares),
            value: first_text(&row, &value),
            share_own: first_text(&row, &share_own),
            sec_form4: first_text(&row, &sec_form4),
            sec_form4_link: first_attr(&row, &sec_form4, "href"),
        })
        .collect();
    Ok(trades)
}

/// Market-wide insider transactions table of the home page.
pub fn market_insider_trades(html: &str) -> Result<Vec<MarketInsiderTrade>, Error> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let table = root
        .select(&selector("div.col-8.pb-4 table.table-sm")?)
        .next()
        .ok_or_else(|| Error::NotFound("market insider trades table".into()))?;

    let cell = selector("td")?;
    let link = selector("a")?;
    let insider = selector("span.home-insider-desktop")?;

    let mut trades = Vec::new();
    for row in table.select(&selector("tbody tr")?) {
        let cols: Vec<_> = row.select(&cell).collect();
        if cols.len() < 8 {
            continue;
        }
        trades.push(MarketInsiderTrade {
            ticker: first_text(&cols[0], &link),
            insider: first_text(&cols[1], &insider),
            trade_type: text_of(&cols[2]),
            cost: text_of(&cols[3]),
            shares: text_of(&cols[4]),
            value: text_of(&cols[5]),
            share_own: text_of(&cols[6]),
            sec_form4_date: first_text(&cols[7], &link),
            sec_form4_link: first_attr(&cols[7], &link, "href"),
        });
    }
    Ok(trades)
}
