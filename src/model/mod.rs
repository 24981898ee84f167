//! Types that represent the core data model, such as `Sheet` and `Row`, and
//! the derived list and analytics projections.

mod list_item;
mod period;
mod series;
mod sheet;

pub use list_item::{Metrics, SearchParams, SearchPeriod, SheetListItem, SortDirection, SortKey};
pub use period::{label_month, month_key, month_label, Period, ALL_TIME_LABEL, RANGE_LABEL};
pub use series::{AnalyticsParams, AnalyticsSeries, ChartData, Dataset, GroupBy, SeriesKind};
pub use sheet::{parse_when, Column, Row, Sheet, SheetType};
