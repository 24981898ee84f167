//! Time windows for filtering dated records and the chart labels derived
//! from them.

use chrono::{Datelike, Months, NaiveDate};

/// Synthetic label used when the whole history collapses into one bucket.
pub const ALL_TIME_LABEL: &str = "Total";

/// Synthetic label used for an explicit start/end range.
pub const RANGE_LABEL: &str = "Período selecionado";

/// Short pt-BR month names used in period labels.
const MONTHS_SHORT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// A time window used to decide whether a dated record is in scope.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    #[default]
    All,
    SixMonths,
    OneYear,
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Whether `date` falls inside this window, evaluated against `today`.
    ///
    /// The relative windows start at the first day of the month six or
    /// twelve months back (month-based, not day-precise); ranges are
    /// inclusive on both ends.
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Period::All => true,
            Period::SixMonths => date >= months_back(today, 6),
            Period::OneYear => date >= months_back(today, 12),
            Period::Range { start, end } => *start <= date && date <= *end,
        }
    }

    /// Chart labels for this window, generated independently of any data:
    /// one label per month, oldest first, for the relative windows; a single
    /// synthetic label otherwise.
    pub fn labels(&self, today: NaiveDate) -> Vec<String> {
        let months: u32 = match self {
            Period::SixMonths => 6,
            Period::OneYear => 12,
            Period::All => return vec![ALL_TIME_LABEL.to_string()],
            Period::Range { .. } => return vec![RANGE_LABEL.to_string()],
        };
        (0..months)
            .rev()
            .map(|i| month_label(months_back(today, i)))
            .collect()
    }

    /// The single label used when this window collapses into one bucket.
    pub fn collapsed_label(&self) -> &'static str {
        match self {
            Period::Range { .. } => RANGE_LABEL,
            _ => ALL_TIME_LABEL,
        }
    }

    /// Short tag carried on analytics series: `6months`, `1year`, `all` or
    /// `custom`.
    pub fn tag(&self) -> &'static str {
        match self {
            Period::All => "all",
            Period::SixMonths => "6months",
            Period::OneYear => "1year",
            Period::Range { .. } => "custom",
        }
    }
}

/// The month (first day) that label position `idx` refers to, for a label
/// sequence of `label_count` months ending at the current month. Mirrors the
/// ordering produced by [`Period::labels`].
pub fn label_month(today: NaiveDate, label_count: usize, idx: usize) -> NaiveDate {
    months_back(today, (label_count - 1 - idx) as u32)
}

/// Bucket key for calendar-month grouping: `"{year}-{month}"`, month
/// 1-based, no padding.
pub fn month_key(date: NaiveDate) -> String {
    format!("{}-{}", date.year(), date.month())
}

/// Human label for a month, e.g. `"jan 2026"`.
pub fn month_label(date: NaiveDate) -> String {
    format!("{} {}", MONTHS_SHORT[date.month0() as usize], date.year())
}

/// The first day of the month `months` months before `today`.
fn months_back(today: NaiveDate, months: u32) -> NaiveDate {
    let first = today.with_day(1).expect("day 1 is valid in every month");
    first.checked_sub_months(Months::new(months)).unwrap_or(first)
}
