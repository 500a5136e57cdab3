use serde::{Deserialize, Serialize};

/// One `<option>` of the screener filter form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScreenerOption {
    pub name: String,
    pub value: String,
}

/// Full row of the screener overview table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerRow {
    pub ticker: String,
    pub company: String,
    pub industry: String,
    pub sector: String,
    pub country: String,
    pub market_cap: String,
    pub price: String,
    pub change: String,
    pub volume: String,
}

/// Identifying columns of a screener row, used by the preset screens.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScreenerStock {
    pub ticker: String,
    pub company: String,
    pub industry: String,
    pub sector: String,
    pub country: String,
}

impl From<ScreenerRow> for ScreenerStock {
    fn from(row: ScreenerRow) -> Self {
        Self {
            ticker: row.ticker,
            company: row.company,
            industry: row.industry,
            sector: row.sector,
            country: row.country,
        }
    }
}

/// One page of screener results.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerPage<T> {
    pub page: i64,
    pub total_pages: i64,
    pub data: Vec<T>,
}
