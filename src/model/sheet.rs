use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The kind of financial data a sheet holds. Every row belongs to exactly
/// one sheet and inherits its type.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SheetType {
    Investments,
    Income,
    Expenses,
}

serde_plain::derive_display_from_serialize!(SheetType);
serde_plain::derive_fromstr_from_deserialize!(SheetType);

impl SheetType {
    /// Display name used in user-facing messages.
    pub fn title(&self) -> &'static str {
        match self {
            SheetType::Investments => "Investimentos",
            SheetType::Income => "Entradas",
            SheetType::Expenses => "Despesas",
        }
    }
}

/// One entry of a sheet's column schema. The core carries it through
/// duplication unchanged and does not interpret it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub key: String,
    pub label: String,
}

/// A single row of a sheet. One struct serves all three sheet types; the
/// type-specific fields are optional, and the value rules treat absent
/// fields as zero or missing.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Monetary value of an income or expense row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    /// Date of an income row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Date of an expense row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Number of units held by an investment row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    /// Average purchase price of an investment row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_price: Option<f64>,

    /// Values from user-defined columns that the core does not interpret.
    #[serde(flatten)]
    pub other_fields: BTreeMap<String, serde_json::Value>,
}

impl Row {
    /// Sum rule for income and expense rows: a missing `amount` counts as zero.
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    /// Value rule for investment rows: `quantity * avg_price`, with missing
    /// operands counting as zero.
    pub fn invested_value(&self) -> f64 {
        self.quantity.unwrap_or(0.0) * self.avg_price.unwrap_or(0.0)
    }

    /// The raw date field for a row of the given sheet type: `dueDate` for
    /// expenses, `date` otherwise.
    pub fn date_field(&self, kind: SheetType) -> Option<&str> {
        match kind {
            SheetType::Expenses => self.due_date.as_deref(),
            _ => self.date.as_deref(),
        }
    }

    /// The parsed date for a row of the given sheet type. `None` when the
    /// field is absent or unparseable; such rows are excluded from every
    /// aggregate rather than failing the pipeline.
    pub fn when(&self, kind: SheetType) -> Option<NaiveDate> {
        self.date_field(kind).and_then(parse_when)
    }
}

/// A named, typed collection of financial rows. Sheets are owned by the
/// backend; the core reads and writes them only through the collaborator
/// interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SheetType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Total value of the sheet under its type-specific rule: summed
    /// invested value for investments, summed amounts for income and
    /// expenses.
    pub fn total(&self) -> f64 {
        match self.kind {
            SheetType::Investments => self.rows.iter().map(Row::invested_value).sum(),
            SheetType::Income | SheetType::Expenses => {
                self.rows.iter().map(Row::amount_or_zero).sum()
            }
        }
    }
}

/// Parses a row date leniently: RFC 3339 timestamps or plain `YYYY-MM-DD`.
/// Returns `None` for anything else.
pub fn parse_when(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_when() {
        assert_eq!(
            parse_when("2023-06-10T10:00:00Z"),
            Some(date(2023, 6, 10))
        );
        assert_eq!(
            parse_when("2023-06-10T10:00:00-03:00"),
            Some(date(2023, 6, 10))
        );
        assert_eq!(parse_when("2023-06-10"), Some(date(2023, 6, 10)));
        assert_eq!(parse_when(""), None);
        assert_eq!(parse_when("not a date"), None);
        assert_eq!(parse_when("10/06/2023"), None);
    }

    #[test]
    fn test_row_date_field_by_type() {
        let row = Row {
            date: Some("2023-01-05".to_string()),
            due_date: Some("2023-02-20".to_string()),
            ..Row::default()
        };
        assert_eq!(row.when(SheetType::Income), Some(date(2023, 1, 5)));
        assert_eq!(row.when(SheetType::Expenses), Some(date(2023, 2, 20)));
        assert_eq!(row.when(SheetType::Investments), Some(date(2023, 1, 5)));
    }

    #[test]
    fn test_row_when_missing_or_malformed() {
        assert_eq!(Row::default().when(SheetType::Income), None);
        let bad = Row {
            due_date: Some("soon".to_string()),
            ..Row::default()
        };
        assert_eq!(bad.when(SheetType::Expenses), None);
    }

    #[test]
    fn test_value_rules_treat_missing_as_zero() {
        let empty = Row::default();
        assert_eq!(empty.amount_or_zero(), 0.0);
        assert_eq!(empty.invested_value(), 0.0);

        let half = Row {
            quantity: Some(10.0),
            ..Row::default()
        };
        assert_eq!(half.invested_value(), 0.0);
    }

    #[test]
    fn test_sheet_total_by_type() {
        let mut sheet = Sheet {
            id: "s1".to_string(),
            name: "Investimentos 2023".to_string(),
            kind: SheetType::Investments,
            created_at: "2023-06-10T10:00:00Z".parse().unwrap(),
            columns: Vec::new(),
            rows: vec![
                Row {
                    quantity: Some(10.0),
                    avg_price: Some(25.0),
                    ..Row::default()
                },
                Row {
                    quantity: Some(2.0),
                    avg_price: Some(100.0),
                    ..Row::default()
                },
                // Missing operands contribute nothing.
                Row {
                    amount: Some(999.0),
                    ..Row::default()
                },
            ],
        };
        assert_eq!(sheet.total(), 450.0);

        sheet.kind = SheetType::Income;
        assert_eq!(sheet.total(), 999.0);
    }

    #[test]
    fn test_sheet_deserializes_backend_shape() {
        let json = r#"{
            "id": "abc",
            "name": "Despesas Mensais",
            "type": "expenses",
            "createdAt": "2023-07-15T14:30:00Z",
            "columns": [{"key": "amount", "label": "Valor"}],
            "rows": [{"id": "r1", "amount": 40.0, "dueDate": "2023-07-20", "category": "Alimentação"}]
        }"#;
        let sheet: Sheet = serde_json::from_str(json).unwrap();
        assert_eq!(sheet.kind, SheetType::Expenses);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].due_date.as_deref(), Some("2023-07-20"));
        assert_eq!(sheet.total(), 40.0);
    }
}
