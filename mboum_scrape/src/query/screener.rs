//! Query builder for the `/screener` pages.

use url::Url;

use super::common::{Query, SortDirection};

/// Builder for a screener request.
///
/// Filters are upstream parameter/code pairs (for example `cntry` /
/// `united-states`) and are emitted in insertion order. Setting the same
/// parameter twice keeps the last code. When a page is set the request goes
/// to `/screener/{page}`, otherwise to `/screener`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScreenerQuery {
    page: Option<i64>,
    filters: Vec<(String, String)>,
    view: Option<String>,
    sort_direction: Option<SortDirection>,
}

impl ScreenerQuery {
    /// Requests a specific result page (1-indexed).
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Adds an upstream filter parameter.
    pub fn with_filter(mut self, param: &str, code: &str) -> Self {
        match self.filters.iter_mut().find(|(p, _)| p == param) {
            Some(existing) => existing.1 = code.to_string(),
            None => self.filters.push((param.to_string(), code.to_string())),
        }
        self
    }

    /// Selects the result table layout (`t=`), e.g. `overview`.
    pub fn with_view(mut self, view: &str) -> Self {
        self.view = Some(view.to_string());
        self
    }

    /// Sets the sort direction (`st=`).
    pub fn with_sort_direction(mut self, sort_direction: SortDirection) -> Self {
        self.sort_direction = Some(sort_direction);
        self
    }

    /// Page requested by this query, if any.
    pub fn page(&self) -> Option<i64> {
        self.page
    }

    /// Upstream path for this query.
    pub fn path(&self) -> String {
        match self.page {
            Some(page) => format!("/screener/{}", page),
            None => "/screener".to_string(),
        }
    }

    /// Low-dividend stocks trading near their 52-week low with a buy rating.
    pub fn oversold(country_code: &str) -> Self {
        Self::default()
            .with_filter("cntry", country_code)
            .with_filter("dividend", "div_0_1")
            .with_filter("volume", "vol_o_50")
            .with_filter("wklchg52", "52wklchg_up_0_5")
            .with_filter("recomm", "recomm_1_3")
            .with_sort_direction(SortDirection::Desc)
    }

    /// Non-dividend stocks trading near their 52-week high with a buy rating.
    pub fn overbought(country_code: &str) -> Self {
        Self::default()
            .with_filter("cntry", country_code)
            .with_filter("dividend", "div_u")
            .with_filter("volume", "vol_o_50")
            .with_filter("wkhchg52", "52wkhchg_down_0_5")
            .with_filter("recomm", "recomm_1_35")
            .with_sort_direction(SortDirection::Desc)
    }

    /// Liquid stocks above $10 reporting earnings this week.
    pub fn upcoming_earnings(country_code: &str) -> Self {
        Self::default()
            .with_filter("cntry", country_code)
            .with_filter("earnings", "earnings_tw")
            .with_filter("price", "price_o_10")
            .with_filter("volume", "vol_o_500")
            .with_view("overview")
            .with_sort_direction(SortDirection::Asc)
    }
}

impl Query for ScreenerQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (param, code) in &self.filters {
                pairs.append_pair(param, code);
            }
            if let Some(view) = &self.view {
                pairs.append_pair("t", view);
            }
            if let Some(sort_direction) = self.sort_direction {
                pairs.append_pair("st", &sort_direction.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }
}
