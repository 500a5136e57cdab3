use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Company name and business summary from a quote page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub name: String,
    pub description: String,
}

/// Key statistics table from a quote page.
///
/// Labels are camel-cased (`"Market Cap"` becomes `marketCap`) and flattened
/// next to the symbol and company name when serialized.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub symbol: String,
    pub name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AnalystRating {
    pub analyst: String,
    pub rating: String,
    pub date: String,
}
