// Exploratory diagnostics over the loaded export: shape, duplicates, gaps,
// distinct categories and a quick description of Quantity.
use crate::cleaning::has_nonpositive;
use crate::types::{
    CategoricalColumn, RawRow, SalesRow, SalesTable, ALL_COLUMNS, COL_ITEM, COL_LOCATION,
    COL_PAYMENT_METHOD, COL_PRICE_PER_UNIT, COL_QUANTITY, COL_TOTAL_SPENT, COL_TRANSACTION_DATE,
    COL_TRANSACTION_ID, SENTINELS,
};
use crate::util::{average, distinct, format_int, format_number, quantile, std_dev};
use std::collections::HashSet;
use tabled::Tabled;

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct ColumnMissing {
    #[tabled(rename = "Column")]
    pub column: &'static str,
    #[tabled(rename = "Missing", display_with = "display_count")]
    pub missing: usize,
}

fn display_count(n: &usize) -> String {
    format_int(*n as u64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            count: sorted.len(),
            mean: average(&sorted),
            std: std_dev(&sorted),
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    /// `(statistic, value)` pairs in the usual describe() order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("count", format_int(self.count as u64)),
            ("mean", format_number(self.mean, 2)),
            ("std", format_number(self.std, 2)),
            ("min", format_number(self.min, 2)),
            ("25%", format_number(self.q25, 2)),
            ("50%", format_number(self.q50, 2)),
            ("75%", format_number(self.q75, 2)),
            ("max", format_number(self.max, 2)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableProfile {
    pub rows: usize,
    pub columns: usize,
    pub duplicate_rows: usize,
    pub missing: Vec<ColumnMissing>,
    pub distinct: Vec<(&'static str, Vec<String>)>,
    pub date_sentinels: Vec<(&'static str, usize)>,
    pub nonpositive_rows: usize,
    pub quantity: Option<NumericSummary>,
}

/// Rows identical to an earlier row in every column.
pub fn count_duplicates(raw: &[RawRow]) -> usize {
    let mut seen = HashSet::new();
    raw.iter().filter(|r| !seen.insert(*r)).count()
}

fn is_missing(row: &SalesRow, column: &str) -> bool {
    match column {
        COL_TRANSACTION_ID => row.transaction_id.is_none(),
        COL_ITEM => row.item.is_none(),
        COL_QUANTITY => row.quantity.is_none(),
        COL_PRICE_PER_UNIT => row.price_per_unit.is_none(),
        COL_TOTAL_SPENT => row.total_spent.is_none(),
        COL_PAYMENT_METHOD => row.payment_method.is_none(),
        COL_LOCATION => row.location.is_none(),
        COL_TRANSACTION_DATE => row.transaction_date.is_none(),
        _ => false,
    }
}

/// Missing cells per column. Placeholder text in the categorical columns
/// counts as present until the categorical imputer has run.
pub fn missing_counts(table: &SalesTable) -> Vec<ColumnMissing> {
    ALL_COLUMNS
        .iter()
        .map(|&column| ColumnMissing {
            column,
            missing: table.rows.iter().filter(|r| is_missing(r, column)).count(),
        })
        .collect()
}

/// Profile an export: `raw` as read from disk, `table` after type coercion.
pub fn profile(raw: &[RawRow], table: &SalesTable) -> TableProfile {
    let distinct_values = CategoricalColumn::ALL
        .iter()
        .map(|c| {
            let values = distinct(table.rows.iter().filter_map(|r| c.get(r)));
            (c.name(), values)
        })
        .collect();

    let date_sentinels = SENTINELS
        .iter()
        .map(|&s| {
            let n = raw
                .iter()
                .filter(|r| r.transaction_date.as_deref().map(str::trim) == Some(s))
                .count();
            (s, n)
        })
        .collect();

    let nonpositive_rows = table
        .rows
        .iter()
        .filter(|r| has_nonpositive(r))
        .count();

    let quantities: Vec<f64> = table.rows.iter().filter_map(|r| r.quantity).collect();

    TableProfile {
        rows: table.len(),
        columns: ALL_COLUMNS.len(),
        duplicate_rows: count_duplicates(raw),
        missing: missing_counts(table),
        distinct: distinct_values,
        date_sentinels,
        nonpositive_rows,
        quantity: NumericSummary::from_values(&quantities),
    }
}
