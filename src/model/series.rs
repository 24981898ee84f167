use crate::model::Period;
use serde::{Deserialize, Serialize};

/// Which of the four fixed charts a series feeds.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Cashflow,
    Expenses,
    Investments,
    Goals,
}

serde_plain::derive_display_from_serialize!(SeriesKind);

/// One labeled numeric series within a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Labels plus the datasets aligned to them. Every dataset holds exactly
/// `labels.len()` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// One chart-ready dataset bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSeries {
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub title: String,
    /// The period tag the series was computed for (`6months`, `1year`,
    /// `all` or `custom`).
    pub period: String,
    pub data: ChartData,
}

/// How analytics rows are bucketed. Only `Month` produces a time axis; the
/// other groupings collapse the window into period totals.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Month,
    Year,
    Category,
}

serde_plain::derive_display_from_serialize!(GroupBy);
serde_plain::derive_fromstr_from_deserialize!(GroupBy);

/// Parameters for computing the analytics series.
#[derive(Debug, Default, Clone)]
pub struct AnalyticsParams {
    pub period: Period,
    pub group_by: GroupBy,
}
