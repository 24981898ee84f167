use crate::model::SheetType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived, read-only projection of a sheet for list display. Recomputed on
/// every query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetListItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SheetType,
    pub created_at: DateTime<Utc>,
    pub metrics: Metrics,
}

/// Computed metrics shown alongside a sheet in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total: f64,
    pub count: usize,
}

/// Month filter for list queries: either everything, or sheets created in
/// one exact calendar month.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SearchPeriod {
    #[default]
    All,
    Month { month: u32, year: i32 },
}

/// Sort key for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Date,
    Total,
}

serde_plain::derive_display_from_serialize!(SortKey);
serde_plain::derive_fromstr_from_deserialize!(SortKey);

/// Direction used together with an explicit sort key. The default ordering
/// when no key is given is `created_at` descending, regardless of this.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

serde_plain::derive_display_from_serialize!(SortDirection);
serde_plain::derive_fromstr_from_deserialize!(SortDirection);

/// Parameters for listing sheets. `Default` means: no query, all periods,
/// most recently created first.
#[derive(Debug, Default, Clone)]
pub struct SearchParams {
    /// Case-insensitive substring match on the sheet name, trimmed first.
    pub query: Option<String>,
    pub period: SearchPeriod,
    pub sort_by: Option<SortKey>,
    pub direction: SortDirection,
}
