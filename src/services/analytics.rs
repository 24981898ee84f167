//! The analytics composer: one backend fetch, four chart-ready series
//! derived from the same in-memory snapshot.

use crate::api::Backend;
use crate::model::{
    label_month, month_key, AnalyticsParams, AnalyticsSeries, ChartData, Dataset, GroupBy, Row,
    SeriesKind, Sheet, SheetType,
};
use crate::services::aggregate::{group_by_category, group_by_month, Buckets};
use crate::Result;
use anyhow::bail;
use chrono::{Local, NaiveDate};
use tracing::error;

const CASHFLOW_TITLE: &str = "Fluxo de Caixa Consolidado";
const EXPENSES_TITLE: &str = "Alocação de Gastos por Categoria";
const INVESTMENTS_TITLE: &str = "Evolução de Investimentos";
const GOALS_TITLE: &str = "Metas vs Realizado";

const INCOME_LABEL: &str = "Entradas";
const EXPENSE_LABEL: &str = "Despesas";
const INVESTED_LABEL: &str = "Total Investido";
const ACTUAL_LABEL: &str = "Realizado";
const GOAL_LABEL: &str = "Meta";

/// Income targets are modelled as 20% above the realized income.
const GOAL_FACTOR: f64 = 1.2;

/// Computes the four chart series, always in this fixed order: cash flow,
/// expenses by category, investment growth, goals vs actual. All four are
/// derived from a single backend snapshot, so they are consistent with each
/// other.
pub async fn compute_analytics(
    backend: &dyn Backend,
    params: &AnalyticsParams,
) -> Result<Vec<AnalyticsSeries>> {
    let sheets = match backend.fetch_all_sheets().await {
        Ok(sheets) => sheets,
        Err(e) => {
            error!("fetching sheets for analytics failed: {e:#}");
            bail!("Não foi possível carregar as análises");
        }
    };
    Ok(compose(sheets, params, Local::now().date_naive()))
}

/// The pure composition over an in-memory snapshot. `today` anchors the
/// relative periods and the month axis.
fn compose(
    mut sheets: Vec<Sheet>,
    params: &AnalyticsParams,
    today: NaiveDate,
) -> Vec<AnalyticsSeries> {
    // Keep only the rows inside the requested window, judging each row by
    // its sheet's type-specific date field. Rows without a parseable date
    // are dropped here, whatever the period.
    for sheet in &mut sheets {
        let kind = sheet.kind;
        sheet.rows.retain(|row| match row.when(kind) {
            Some(date) => params.period.contains(date, today),
            None => false,
        });
    }

    let period_labels = params.period.labels(today);
    let monthly = params.group_by == GroupBy::Month && period_labels.len() > 1;
    // When the window does not produce a month axis, everything collapses
    // into a single bucket and the axis collapses with it.
    let labels = if monthly {
        period_labels
    } else {
        vec![params.period.collapsed_label().to_string()]
    };
    let period_tag = params.period.tag().to_string();

    let income_rows: Vec<&Row> = rows_of(&sheets, SheetType::Income).collect();
    let expense_rows: Vec<&Row> = rows_of(&sheets, SheetType::Expenses).collect();
    let investment_rows: Vec<&Row> = rows_of(&sheets, SheetType::Investments).collect();

    // 1. Consolidated cash flow: income and expenses per label position.
    let (income_data, expense_data) = if monthly {
        let income_by_month = group_by_month(income_rows.iter().copied(), SheetType::Income);
        let expense_by_month = group_by_month(expense_rows.iter().copied(), SheetType::Expenses);
        (
            monthly_totals(&income_by_month, labels.len(), today, Row::amount_or_zero),
            monthly_totals(&expense_by_month, labels.len(), today, Row::amount_or_zero),
        )
    } else {
        (
            vec![income_rows.iter().map(|row| row.amount_or_zero()).sum()],
            vec![expense_rows.iter().map(|row| row.amount_or_zero()).sum()],
        )
    };
    let cashflow = AnalyticsSeries {
        kind: SeriesKind::Cashflow,
        title: CASHFLOW_TITLE.to_string(),
        period: period_tag.clone(),
        data: ChartData {
            labels: labels.clone(),
            datasets: vec![
                Dataset {
                    label: INCOME_LABEL.to_string(),
                    data: income_data.clone(),
                },
                Dataset {
                    label: EXPENSE_LABEL.to_string(),
                    data: expense_data,
                },
            ],
        },
    };

    // 2. Expense allocation: one point per category, labels in
    // first-occurrence order.
    let by_category = group_by_category(expense_rows.iter().copied());
    let expenses = AnalyticsSeries {
        kind: SeriesKind::Expenses,
        title: EXPENSES_TITLE.to_string(),
        period: period_tag.clone(),
        data: ChartData {
            labels: by_category.keys().map(str::to_string).collect(),
            datasets: vec![Dataset {
                label: EXPENSE_LABEL.to_string(),
                data: by_category.totals(Row::amount_or_zero),
            }],
        },
    };

    // 3. Investment growth: a cumulative value curve on the month axis, or
    // the total invested value as a single point.
    let investment_data = if monthly {
        let by_month = group_by_month(investment_rows.iter().copied(), SheetType::Investments);
        let mut cumulative = 0.0;
        (0..labels.len())
            .map(|idx| {
                let key = month_key(label_month(today, labels.len(), idx));
                cumulative += by_month.total_for(&key, Row::invested_value);
                cumulative
            })
            .collect()
    } else {
        vec![investment_rows.iter().map(|row| row.invested_value()).sum()]
    };
    let investments = AnalyticsSeries {
        kind: SeriesKind::Investments,
        title: INVESTMENTS_TITLE.to_string(),
        period: period_tag.clone(),
        data: ChartData {
            labels: labels.clone(),
            datasets: vec![Dataset {
                label: INVESTED_LABEL.to_string(),
                data: investment_data,
            }],
        },
    };

    // 4. Goals vs actual: derived from the cash-flow income series, never
    // fetched independently.
    let goal_data: Vec<f64> = income_data.iter().map(|income| income * GOAL_FACTOR).collect();
    let goals = AnalyticsSeries {
        kind: SeriesKind::Goals,
        title: GOALS_TITLE.to_string(),
        period: period_tag,
        data: ChartData {
            labels,
            datasets: vec![
                Dataset {
                    label: ACTUAL_LABEL.to_string(),
                    data: income_data,
                },
                Dataset {
                    label: GOAL_LABEL.to_string(),
                    data: goal_data,
                },
            ],
        },
    };

    vec![cashflow, expenses, investments, goals]
}

/// All rows of every sheet of `kind`.
fn rows_of(sheets: &[Sheet], kind: SheetType) -> impl Iterator<Item = &Row> {
    sheets
        .iter()
        .filter(move |sheet| sheet.kind == kind)
        .flat_map(|sheet| sheet.rows.iter())
}

/// Per-label totals aligned positionally to the month axis: position `idx`
/// maps to the month `label_count - 1 - idx` months before `today`, and a
/// month with no bucket contributes zero.
fn monthly_totals(
    buckets: &Buckets<'_>,
    label_count: usize,
    today: NaiveDate,
    value: impl Fn(&Row) -> f64,
) -> Vec<f64> {
    (0..label_count)
        .map(|idx| buckets.total_for(&month_key(label_month(today, label_count, idx)), &value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Period;
    use chrono::{DateTime, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 8, 15).unwrap()
    }

    fn sheet(kind: SheetType, rows: Vec<Row>) -> Sheet {
        Sheet {
            id: format!("sheet-{kind}"),
            name: format!("{} de Teste", kind.title()),
            kind,
            created_at: "2023-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap(),
            columns: Vec::new(),
            rows,
        }
    }

    fn income_row(amount: f64, date: &str) -> Row {
        Row {
            amount: Some(amount),
            date: Some(date.to_string()),
            ..Row::default()
        }
    }

    fn expense_row(amount: f64, due_date: &str, category: Option<&str>) -> Row {
        Row {
            amount: Some(amount),
            due_date: Some(due_date.to_string()),
            category: category.map(str::to_string),
            ..Row::default()
        }
    }

    fn investment_row(quantity: f64, avg_price: f64, date: &str) -> Row {
        Row {
            quantity: Some(quantity),
            avg_price: Some(avg_price),
            date: Some(date.to_string()),
            ..Row::default()
        }
    }

    fn series_dataset<'a>(series: &'a AnalyticsSeries, label: &str) -> &'a Dataset {
        series
            .data
            .datasets
            .iter()
            .find(|d| d.label == label)
            .unwrap()
    }

    #[test]
    fn test_series_order_and_alignment_invariant() {
        let sheets = vec![
            sheet(SheetType::Income, vec![income_row(100.0, "2023-08-01")]),
            sheet(
                SheetType::Expenses,
                vec![expense_row(40.0, "2023-07-10", Some("Alimentação"))],
            ),
            sheet(
                SheetType::Investments,
                vec![investment_row(10.0, 5.0, "2023-06-02")],
            ),
        ];
        let cases = [
            (Period::All, GroupBy::Month),
            (Period::All, GroupBy::Category),
            (Period::SixMonths, GroupBy::Month),
            (Period::SixMonths, GroupBy::Category),
            (Period::OneYear, GroupBy::Month),
            (
                Period::Range {
                    start: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                    end: NaiveDate::from_ymd_opt(2023, 8, 31).unwrap(),
                },
                GroupBy::Month,
            ),
        ];
        for (period, group_by) in cases {
            let params = AnalyticsParams { period, group_by };
            let result = compose(sheets.clone(), &params, today());
            let kinds: Vec<SeriesKind> = result.iter().map(|series| series.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    SeriesKind::Cashflow,
                    SeriesKind::Expenses,
                    SeriesKind::Investments,
                    SeriesKind::Goals
                ]
            );
            for series in &result {
                for dataset in &series.data.datasets {
                    assert_eq!(
                        dataset.data.len(),
                        series.data.labels.len(),
                        "{} datasets must align with its labels",
                        series.kind
                    );
                }
            }
        }
    }

    #[test]
    fn test_cashflow_totals_without_month_grouping() {
        let sheets = vec![
            sheet(SheetType::Income, vec![income_row(100.0, "2023-08-01")]),
            sheet(
                SheetType::Expenses,
                vec![expense_row(40.0, "2023-08-01", Some("Alimentação"))],
            ),
        ];
        let params = AnalyticsParams {
            period: Period::All,
            group_by: GroupBy::Category,
        };
        let result = compose(sheets, &params, today());
        let cashflow = &result[0];
        assert_eq!(cashflow.data.labels, vec!["Total"]);
        assert_eq!(series_dataset(cashflow, "Entradas").data, vec![100.0]);
        assert_eq!(series_dataset(cashflow, "Despesas").data, vec![40.0]);
        assert_eq!(cashflow.period, "all");
    }

    #[test]
    fn test_cashflow_monthly_alignment_with_gaps() {
        let sheets = vec![
            sheet(
                SheetType::Income,
                vec![
                    income_row(100.0, "2023-08-01"),
                    income_row(250.0, "2023-06-15"),
                    income_row(50.0, "2023-06-20"),
                ],
            ),
            sheet(
                SheetType::Expenses,
                vec![expense_row(40.0, "2023-07-10", None)],
            ),
        ];
        let params = AnalyticsParams {
            period: Period::SixMonths,
            group_by: GroupBy::Month,
        };
        let result = compose(sheets, &params, today());
        let cashflow = &result[0];
        assert_eq!(cashflow.data.labels.len(), 6);
        // mar, abr, mai, jun, jul, ago
        assert_eq!(
            series_dataset(cashflow, "Entradas").data,
            vec![0.0, 0.0, 0.0, 300.0, 0.0, 100.0]
        );
        assert_eq!(
            series_dataset(cashflow, "Despesas").data,
            vec![0.0, 0.0, 0.0, 0.0, 40.0, 0.0]
        );
    }

    #[test]
    fn test_expenses_by_category() {
        let sheets = vec![sheet(
            SheetType::Expenses,
            vec![
                expense_row(10.0, "2023-08-01", Some("Food")),
                expense_row(20.0, "2023-08-02", Some("Food")),
                expense_row(5.0, "2023-08-03", Some("Transport")),
            ],
        )];
        let params = AnalyticsParams {
            period: Period::All,
            group_by: GroupBy::Category,
        };
        let result = compose(sheets, &params, today());
        let expenses = &result[1];
        assert_eq!(expenses.data.labels, vec!["Food", "Transport"]);
        assert_eq!(expenses.data.datasets[0].data, vec![30.0, 5.0]);
    }

    #[test]
    fn test_expenses_missing_category_falls_back_to_outros() {
        let sheets = vec![sheet(
            SheetType::Expenses,
            vec![
                expense_row(10.0, "2023-08-01", None),
                expense_row(15.0, "2023-08-02", Some("Lazer")),
            ],
        )];
        let params = AnalyticsParams {
            period: Period::All,
            group_by: GroupBy::Category,
        };
        let result = compose(sheets, &params, today());
        let expenses = &result[1];
        assert_eq!(expenses.data.labels, vec!["Outros", "Lazer"]);
        assert_eq!(expenses.data.datasets[0].data, vec![10.0, 15.0]);
    }

    #[test]
    fn test_investments_total_without_month_grouping() {
        let sheets = vec![
            sheet(
                SheetType::Investments,
                vec![
                    investment_row(10.0, 25.0, "2023-05-01"),
                    investment_row(2.0, 100.0, "2023-06-01"),
                ],
            ),
            sheet(SheetType::Income, vec![income_row(999.0, "2023-05-01")]),
        ];
        let params = AnalyticsParams {
            period: Period::All,
            group_by: GroupBy::Category,
        };
        let result = compose(sheets, &params, today());
        let investments = &result[2];
        assert_eq!(investments.data.labels, vec!["Total"]);
        assert_eq!(investments.data.datasets[0].data, vec![450.0]);
    }

    #[test]
    fn test_investments_monthly_curve_is_cumulative() {
        let sheets = vec![sheet(
            SheetType::Investments,
            vec![
                investment_row(10.0, 10.0, "2023-06-05"),
                investment_row(1.0, 50.0, "2023-07-20"),
                investment_row(2.0, 25.0, "2023-08-01"),
            ],
        )];
        let params = AnalyticsParams {
            period: Period::SixMonths,
            group_by: GroupBy::Month,
        };
        let result = compose(sheets, &params, today());
        let data = &result[2].data.datasets[0].data;
        // mar..mai hold nothing, then value accumulates month over month.
        assert_eq!(data, &vec![0.0, 0.0, 0.0, 100.0, 150.0, 200.0]);
    }

    #[test]
    fn test_goals_are_twenty_percent_above_income() {
        let sheets = vec![sheet(
            SheetType::Income,
            vec![
                income_row(100.0, "2023-07-03"),
                income_row(200.0, "2023-08-04"),
            ],
        )];
        let params = AnalyticsParams {
            period: Period::SixMonths,
            group_by: GroupBy::Month,
        };
        let result = compose(sheets, &params, today());
        let goals = &result[3];
        let actual = series_dataset(goals, "Realizado");
        let goal = series_dataset(goals, "Meta");
        assert_eq!(actual.data[4..], [100.0, 200.0]);
        assert_eq!(goal.data[4..], [120.0, 240.0]);
        for (realized, target) in actual.data.iter().zip(&goal.data) {
            assert!((target - realized * GOAL_FACTOR).abs() < 1e-9);
        }
    }

    #[test]
    fn test_period_filter_drops_rows_outside_the_window() {
        let sheets = vec![sheet(
            SheetType::Income,
            vec![
                income_row(100.0, "2023-08-01"),
                income_row(500.0, "2021-01-01"),
                income_row(77.0, "not a date"),
            ],
        )];
        let params = AnalyticsParams {
            period: Period::SixMonths,
            group_by: GroupBy::Category,
        };
        let result = compose(sheets, &params, today());
        assert_eq!(series_dataset(&result[0], "Entradas").data, vec![100.0]);
    }

    #[test]
    fn test_unparseable_dates_are_excluded_even_for_all_time() {
        let sheets = vec![sheet(
            SheetType::Income,
            vec![
                income_row(100.0, "2023-08-01"),
                income_row(77.0, "amanhã"),
            ],
        )];
        let params = AnalyticsParams {
            period: Period::All,
            group_by: GroupBy::Category,
        };
        let result = compose(sheets, &params, today());
        assert_eq!(series_dataset(&result[0], "Entradas").data, vec![100.0]);
    }

    #[test]
    fn test_custom_range_collapses_to_a_single_label() {
        let sheets = vec![sheet(
            SheetType::Income,
            vec![income_row(100.0, "2023-03-10")],
        )];
        let params = AnalyticsParams {
            period: Period::Range {
                start: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
            },
            group_by: GroupBy::Month,
        };
        let result = compose(sheets, &params, today());
        assert_eq!(result[0].data.labels, vec!["Período selecionado"]);
        assert_eq!(result[0].period, "custom");
        assert_eq!(series_dataset(&result[0], "Entradas").data, vec![100.0]);
    }
}
