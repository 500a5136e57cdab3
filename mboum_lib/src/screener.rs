//! Multi-criteria screener: human-readable filter values resolved to
//! upstream parameter codes through the lookup tables.

use mboum_scrape::{ScreenerQuery, SortDirection};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lookup::LookupTables;

/// One screener criterion: where its value comes from and how it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenerFilter {
    /// Criterion name as accepted from callers.
    pub field: &'static str,
    /// Upstream query parameter.
    pub param: &'static str,
    /// Lookup table translating names to codes.
    pub table: &'static str,
}

macro_rules! screener_criteria {
    ($( $field:ident => $name:literal, $param:literal, $table:literal; )+) => {
        /// Screener criteria by display name, e.g. `country = "United States"`,
        /// `marketCap = "Large ($10bln to $200bln)"`. Unset criteria are not sent.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct ScreenerCriteria {
            $(
                #[serde(rename = $name, default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<String>,
            )+
        }

        /// Every criterion, in the order its parameter is sent upstream.
        pub const SCREENER_FILTERS: &[ScreenerFilter] = &[
            $( ScreenerFilter { field: $name, param: $param, table: $table }, )+
        ];

        impl ScreenerCriteria {
            /// Criteria that carry a non-blank value, paired with their filter.
            pub fn selected(&self) -> Vec<(&'static ScreenerFilter, &str)> {
                let values: [Option<&str>; SCREENER_FILTERS.len()] =
                    [$( self.$field.as_deref(), )+];
                SCREENER_FILTERS
                    .iter()
                    .zip(values)
                    .filter_map(|(filter, value)| {
                        let value = value?.trim();
                        (!value.is_empty()).then_some((filter, value))
                    })
                    .collect()
            }
        }
    };
}

screener_criteria! {
    country => "country", "cntry", "countries.csv";
    industry => "industry", "indtry", "industry.csv";
    sector => "sector", "sector", "sector.csv";
    market_cap => "marketCap", "marketcap", "market_cap.csv";
    change_percent => "changePercent", "percentchange", "change_percent.csv";
    price => "price", "price", "price.csv";
    volume => "volume", "volume", "volume.csv";
    pe => "pe", "p_e", "pe.csv";
    forward_pe => "forwardPE", "fwd_pe", "forward_pe.csv";
    price_book => "priceBook", "pb", "price_book.csv";
    peg => "peg", "peg", "peg.csv";
    earnings => "earnings", "earnings", "earnings.csv";
    profit_margin => "profitMargin", "profit_m", "profit_margin.csv";
    avg_chg_50d => "avgChg50D", "davgchg50", "50D_avg_change.csv";
    return_on_assets => "returnOnAssets", "roa", "return_on_assets.csv";
    eps_this_year => "epsThisYear", "epsy", "eps_this_y.csv";
    float => "float", "flt", "float.csv";
    return_on_equity => "returnOnEquity", "roe", "return_on_equity.csv";
    eps_next_year => "epsNextYear", "epsny", "eps_next_y.csv";
    float_short => "floatShort", "fltsht", "float_short.csv";
    current_ratio => "currentRatio", "curr_r", "current_ratio.csv";
    eps_past_5_year => "epsPast5Year", "epsp5y", "eps_past_5y.csv";
    shares_outstanding => "sharesOutstanding", "outstd", "shares_outstanding.csv";
    debt_equity => "debtEquity", "debteq", "debt_equity.csv";
    eps_next_5_year => "epsNext5Year", "epsn5y", "eps_next_5y.csv";
    insider_own => "insiderOwn", "insido", "insider_own.csv";
    dividend_yield => "dividendYield", "dividend", "dividend_yield.csv";
    beta => "beta", "beta", "beta.csv";
    gross_margin => "grossMargin", "gross_m", "gross_margin.csv";
    operating_margin => "operatingMargin", "oper_m", "operating_margin.csv";
    earn_quarterly_growth => "earnQuarterlyGrowth", "ernqtrgrth", "earn_quarterly_growth.csv";
    avg_chg_200d => "avgChg200D", "davgchg200", "200D_avg_change.csv";
    high_chg_52w => "highChg52W", "wkhchg52", "52W_high_change.csv";
    low_chg_52w => "lowChg52W", "wklchg52", "52W_low_change.csv";
    analyst_recom => "analystRecom", "recomm", "analyst_recommendations.csv";
}

impl ScreenerCriteria {
    /// Upstream query for `page` of the results matching these criteria.
    ///
    /// Each selected value must exist in its table; the first unknown value
    /// fails with [`Error::InvalidInput`].
    pub fn build_query(&self, tables: &LookupTables, page: i64) -> Result<ScreenerQuery, Error> {
        let mut query = ScreenerQuery::default().with_page(page);
        for (filter, value) in self.selected() {
            let code = tables.require(filter.table, value)?;
            query = query.with_filter(filter.param, &code);
        }
        Ok(query
            .with_view("overview")
            .with_sort_direction(SortDirection::Asc))
    }
}
