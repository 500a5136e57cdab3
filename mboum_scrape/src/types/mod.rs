mod quote;
pub use self::quote::{AnalystRating, Description, Stats};

mod news;
pub use self::news::{MarketNews, StockNews};

mod insider;
pub use self::insider::{InsiderTrade, MarketInsiderTrade};

mod screener;
pub use self::screener::{ScreenerOption, ScreenerPage, ScreenerRow, ScreenerStock};
