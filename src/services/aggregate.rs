//! Grouping and reduction over sheet rows.
//!
//! Buckets preserve first-occurrence key order and insertion order within
//! each bucket, so chart labels come out in a stable order.

use crate::model::{month_key, Row, SheetType};
use std::collections::HashMap;

/// Bucket key for rows whose category is absent or empty.
pub const DEFAULT_CATEGORY: &str = "Outros";

/// Ordered, string-keyed buckets of rows.
#[derive(Debug, Default)]
pub struct Buckets<'a> {
    order: Vec<String>,
    rows: HashMap<String, Vec<&'a Row>>,
}

impl<'a> Buckets<'a> {
    fn push(&mut self, key: String, row: &'a Row) {
        match self.rows.get_mut(&key) {
            Some(bucket) => bucket.push(row),
            None => {
                self.order.push(key.clone());
                self.rows.insert(key, vec![row]);
            }
        }
    }

    /// Bucket keys in first-occurrence order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Reduces the bucket at `key` with the `value` rule; 0.0 when no such
    /// bucket exists.
    pub fn total_for(&self, key: &str, value: impl Fn(&Row) -> f64) -> f64 {
        self.rows
            .get(key)
            .map(|rows| rows.iter().map(|row| value(row)).sum())
            .unwrap_or(0.0)
    }

    /// Reduces every bucket with the `value` rule, in key order.
    pub fn totals(&self, value: impl Fn(&Row) -> f64) -> Vec<f64> {
        self.keys().map(|key| self.total_for(key, &value)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Partitions `rows` into calendar-month buckets keyed `"{year}-{month}"`,
/// judging each row by the date field of the given sheet type. Rows without
/// a parseable date are skipped.
pub fn group_by_month<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    kind: SheetType,
) -> Buckets<'a> {
    let mut buckets = Buckets::default();
    for row in rows {
        if let Some(date) = row.when(kind) {
            buckets.push(month_key(date), row);
        }
    }
    buckets
}

/// Partitions `rows` by category, using [`DEFAULT_CATEGORY`] for rows whose
/// category is absent or empty.
pub fn group_by_category<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Buckets<'a> {
    let mut buckets = Buckets::default();
    for row in rows {
        let category = match row.category.as_deref() {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        };
        buckets.push(category, row);
    }
    buckets
}
