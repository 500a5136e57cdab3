use serde::{Deserialize, Serialize};

/// Insider transaction row from a quote page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InsiderTrade {
    #[serde(rename = "insiderTrades")]
    pub insider: String,
    pub relationship: String,
    pub date: String,
    pub transactions: String,
    #[serde(rename = "cost($)")]
    pub cost: String,
    pub shares: String,
    #[serde(rename = "value($)")]
    pub value: String,
    #[serde(rename = "shareOwn")]
    pub share_own: String,
    #[serde(rename = "SECForm4")]
    pub sec_form4: String,
    #[serde(rename = "SECForm4Link")]
    pub sec_form4_link: String,
}

/// Insider transaction row from the home page's market-wide table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketInsiderTrade {
    pub ticker: String,
    pub insider: String,
    #[serde(rename = "type")]
    pub trade_type: String,
    #[serde(rename = "cost($)")]
    pub cost: String,
    pub shares: String,
    #[serde(rename = "value($)")]
    pub value: String,
    #[serde(rename = "shareOwn")]
    pub share_own: String,
    #[serde(rename = "SECForm4Date")]
    pub sec_form4_date: String,
    #[serde(rename = "SECForm4Link")]
    pub sec_form4_link: String,
}
