mod common;
pub use self::common::{Query, SortDirection};

mod screener;
pub use self::screener::ScreenerQuery;
