use serde::{Deserialize, Serialize};

/// Headline listed on a quote page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StockNews {
    pub time: String,
    pub headline: String,
    pub link: String,
}

/// Headline listed on the `/news` page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketNews {
    pub time: String,
    pub headline: String,
    pub authors: String,
}
