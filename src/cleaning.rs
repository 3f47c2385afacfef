// Cleaning stages for the sales table.
//
// Each stage consumes a `SalesTable` and hands back a new one; `clean`
// strings them together in a fixed order and records what every stage did.
use crate::types::{CategoricalColumn, CleanRecord, RawRow, SalesRow, SalesTable};
use crate::util::{clean_text, is_sentinel, mode, parse_date_safe, parse_f64_safe};
use chrono::NaiveDate;
use log::{debug, info, warn};

/// Which of quantity / price / total is absent on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingNumeric {
    Complete,
    Quantity,
    PricePerUnit,
    TotalSpent,
    /// Two or three fields missing; nothing can be inferred.
    Underdetermined,
}

pub fn classify(row: &SalesRow) -> MissingNumeric {
    match (row.quantity, row.price_per_unit, row.total_spent) {
        (Some(_), Some(_), Some(_)) => MissingNumeric::Complete,
        (None, Some(_), Some(_)) => MissingNumeric::Quantity,
        (Some(_), None, Some(_)) => MissingNumeric::PricePerUnit,
        (Some(_), Some(_), None) => MissingNumeric::TotalSpent,
        _ => MissingNumeric::Underdetermined,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFill {
    pub column: &'static str,
    pub sentinels: usize,
    pub filled: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub categorical: Vec<ColumnFill>,
    pub dates_filled: usize,
    pub dates_unfilled: usize,
    pub dropped_nonpositive: usize,
    pub inferred: usize,
    pub dropped_incomplete: usize,
    pub dropped_unresolved: usize,
    pub clean_rows: usize,
}

/// Coerce the numeric and date columns. Unparsable cells become missing;
/// no row is dropped.
pub fn normalize_types(raw: Vec<RawRow>) -> SalesTable {
    let rows = raw
        .into_iter()
        .map(|r| SalesRow {
            quantity: parse_f64_safe(r.quantity.as_deref()),
            price_per_unit: parse_f64_safe(r.price_per_unit.as_deref()),
            total_spent: parse_f64_safe(r.total_spent.as_deref()),
            transaction_date: parse_date_safe(r.transaction_date.as_deref()),
            transaction_id: clean_text(r.transaction_id),
            item: clean_text(r.item),
            payment_method: clean_text(r.payment_method),
            location: clean_text(r.location),
        })
        .collect();
    SalesTable::new(rows)
}

/// Turn placeholders into missing values, then fill every gap in the
/// column with its mode. A column with no real values stays missing.
pub fn impute_categorical(mut table: SalesTable, column: CategoricalColumn) -> SalesTable {
    for row in table.rows.iter_mut() {
        let cell = column.get_mut(row);
        if cell.as_deref().is_some_and(is_sentinel) {
            *cell = None;
        }
    }

    let Some(fill) = mode(table.rows.iter().filter_map(|r| column.get(r))) else {
        warn!("impute_categorical: {} has no values to take a mode from", column.name());
        return table;
    };
    debug!("impute_categorical: {} mode is {:?}", column.name(), fill);

    for row in table.rows.iter_mut() {
        let cell = column.get_mut(row);
        if cell.is_none() {
            *cell = Some(fill.clone());
        }
    }
    table
}

pub fn impute_categoricals(table: SalesTable) -> SalesTable {
    CategoricalColumn::ALL
        .into_iter()
        .fold(table, impute_categorical)
}

/// Forward-fill missing dates in row order. A leading run of missing dates
/// has nothing to copy from and is left as is.
pub fn impute_dates(mut table: SalesTable) -> SalesTable {
    let mut last: Option<NaiveDate> = None;
    for row in table.rows.iter_mut() {
        match row.transaction_date {
            Some(d) => last = Some(d),
            None => row.transaction_date = last,
        }
    }
    table
}

/// True when a present quantity, price or total is zero or negative.
pub fn has_nonpositive(row: &SalesRow) -> bool {
    [row.quantity, row.price_per_unit, row.total_spent]
        .into_iter()
        .flatten()
        .any(|v| v <= 0.0)
}

/// Drop rows with a present quantity, price or total that is not positive.
/// Missing fields do not count against the row.
pub fn drop_nonpositive(mut table: SalesTable) -> SalesTable {
    table.rows.retain(|r| !has_nonpositive(r));
    table
}

/// Fill the one missing field of quantity / price / total from the other two.
pub fn infer_row(mut row: SalesRow) -> SalesRow {
    let (q, p, t) = (row.quantity, row.price_per_unit, row.total_spent);
    match classify(&row) {
        MissingNumeric::Quantity => {
            row.quantity = t.zip(p).map(|(t, p)| t / p).filter(|v| v.is_finite())
        }
        MissingNumeric::PricePerUnit => {
            row.price_per_unit = t.zip(q).map(|(t, q)| t / q).filter(|v| v.is_finite())
        }
        MissingNumeric::TotalSpent => {
            row.total_spent = q.zip(p).map(|(q, p)| q * p).filter(|v| v.is_finite())
        }
        MissingNumeric::Complete | MissingNumeric::Underdetermined => {}
    }
    row
}

pub fn infer_missing_numeric(table: SalesTable) -> SalesTable {
    SalesTable::new(table.rows.into_iter().map(infer_row).collect())
}

pub fn clip_negative(mut table: SalesTable) -> SalesTable {
    for row in table.rows.iter_mut() {
        row.quantity = row.quantity.map(|v| v.max(0.0));
        row.price_per_unit = row.price_per_unit.map(|v| v.max(0.0));
        row.total_spent = row.total_spent.map(|v| v.max(0.0));
    }
    table
}

/// Keep rows whose quantity, price and total are all present and positive.
/// An inferred amount can underflow to zero, which the clip lets through.
pub fn drop_incomplete(mut table: SalesTable) -> SalesTable {
    table
        .rows
        .retain(|r| classify(r) == MissingNumeric::Complete && !has_nonpositive(r));
    table
}

/// The whole numeric step: filter, infer, clip, drop what is still missing.
pub fn validate_numeric(table: SalesTable) -> SalesTable {
    drop_incomplete(clip_negative(infer_missing_numeric(drop_nonpositive(table))))
}

/// Convert rows with every field present. Anything still missing here (a
/// leading run of undated rows, or a column that had no mode) is dropped.
pub fn finalize(table: SalesTable) -> Vec<CleanRecord> {
    table
        .rows
        .into_iter()
        .filter_map(|r| {
            Some(CleanRecord {
                item: r.item?,
                quantity: r.quantity?,
                price_per_unit: r.price_per_unit?,
                total_spent: r.total_spent?,
                payment_method: r.payment_method?,
                location: r.location?,
                transaction_date: r.transaction_date?,
                transaction_id: r.transaction_id,
            })
        })
        .collect()
}

fn count_missing(table: &SalesTable, column: CategoricalColumn) -> usize {
    table.rows.iter().filter(|r| column.get(r).is_none()).count()
}

fn count_sentinels(table: &SalesTable, column: CategoricalColumn) -> usize {
    table
        .rows
        .iter()
        .filter(|r| column.get(r).is_some_and(|v| is_sentinel(v)))
        .count()
}

fn count_missing_dates(table: &SalesTable) -> usize {
    table.rows.iter().filter(|r| r.transaction_date.is_none()).count()
}

/// Run every stage after type coercion, in order, and record what each did.
pub fn clean_table(table: SalesTable) -> (Vec<CleanRecord>, CleanReport) {
    let mut report = CleanReport {
        input_rows: table.len(),
        ..Default::default()
    };

    let gaps: Vec<(usize, usize)> = CategoricalColumn::ALL
        .iter()
        .map(|c| {
            let sentinels = count_sentinels(&table, *c);
            (sentinels, count_missing(&table, *c) + sentinels)
        })
        .collect();
    let table = impute_categoricals(table);
    for (column, (sentinels, gaps)) in CategoricalColumn::ALL.into_iter().zip(gaps) {
        let filled = gaps - count_missing(&table, column);
        debug!(
            "clean: {} had {} placeholders, filled {} cells",
            column.name(),
            sentinels,
            filled
        );
        report.categorical.push(ColumnFill {
            column: column.name(),
            sentinels,
            filled,
        });
    }

    let missing_dates = count_missing_dates(&table);
    let table = impute_dates(table);
    report.dates_unfilled = count_missing_dates(&table);
    report.dates_filled = missing_dates - report.dates_unfilled;
    debug!(
        "clean: forward-filled {} dates, {} leading rows left undated",
        report.dates_filled, report.dates_unfilled
    );

    let before = table.len();
    report.dropped_nonpositive = table.rows.iter().filter(|r| has_nonpositive(r)).count();
    report.inferred = table
        .rows
        .iter()
        .filter(|r| !has_nonpositive(r))
        .filter(|r| {
            matches!(
                classify(r),
                MissingNumeric::Quantity | MissingNumeric::PricePerUnit | MissingNumeric::TotalSpent
            )
        })
        .count();
    let table = validate_numeric(table);
    report.dropped_incomplete = before - report.dropped_nonpositive - table.len();

    let before = table.len();
    let records = finalize(table);
    report.dropped_unresolved = before - records.len();
    report.clean_rows = records.len();

    info!(
        "clean: {} rows in, {} rows out ({} non-positive, {} incomplete, {} unresolved dropped; {} inferred)",
        report.input_rows,
        report.clean_rows,
        report.dropped_nonpositive,
        report.dropped_incomplete,
        report.dropped_unresolved,
        report.inferred
    );
    (records, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn numeric(q: Option<f64>, p: Option<f64>, t: Option<f64>) -> SalesRow {
        SalesRow {
            quantity: q,
            price_per_unit: p,
            total_spent: t,
            ..Default::default()
        }
    }

    fn full_row(item: &str, q: f64, p: f64, t: f64, day: u32) -> SalesRow {
        SalesRow {
            transaction_id: Some(format!("TXN_{day}")),
            item: Some(item.to_string()),
            quantity: Some(q),
            price_per_unit: Some(p),
            total_spent: Some(t),
            payment_method: Some("Cash".to_string()),
            location: Some("In-store".to_string()),
            transaction_date: Some(date(2023, 1, day)),
        }
    }

    fn items(table: &SalesTable) -> Vec<Option<&str>> {
        table.rows.iter().map(|r| r.item.as_deref()).collect()
    }

    #[test]
    fn test_normalize_types_coerces_without_dropping() {
        let raw = vec![
            RawRow {
                item: Some(" Coffee ".to_string()),
                quantity: Some("2".to_string()),
                price_per_unit: Some("2.0".to_string()),
                total_spent: Some("ERROR".to_string()),
                transaction_date: Some("2023-09-08".to_string()),
                ..Default::default()
            },
            RawRow {
                quantity: Some("UNKNOWN".to_string()),
                transaction_date: Some("UNKNOWN".to_string()),
                payment_method: Some("ERROR".to_string()),
                ..Default::default()
            },
        ];
        let table = normalize_types(raw);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].item.as_deref(), Some("Coffee"));
        assert_eq!(table.rows[0].quantity, Some(2.0));
        assert_eq!(table.rows[0].total_spent, None);
        assert_eq!(table.rows[0].transaction_date, Some(date(2023, 9, 8)));
        assert_eq!(table.rows[1].quantity, None);
        assert_eq!(table.rows[1].transaction_date, None);
        // Placeholders in text columns survive until the categorical imputer.
        assert_eq!(table.rows[1].payment_method.as_deref(), Some("ERROR"));
    }

    #[test]
    fn test_impute_categorical_replaces_sentinel_with_mode() {
        let rows = ["A", "A", "UNKNOWN", "B"]
            .iter()
            .map(|v| SalesRow {
                item: Some(v.to_string()),
                ..Default::default()
            })
            .collect();
        let table = impute_categorical(SalesTable::new(rows), CategoricalColumn::Item);
        assert_eq!(items(&table), vec![Some("A"), Some("A"), Some("A"), Some("B")]);
    }

    #[test]
    fn test_impute_categorical_fills_blanks_and_errors() {
        let rows = vec![
            SalesRow { location: None, ..Default::default() },
            SalesRow { location: Some("Takeaway".to_string()), ..Default::default() },
            SalesRow { location: Some("ERROR".to_string()), ..Default::default() },
            SalesRow { location: Some("In-store".to_string()), ..Default::default() },
        ];
        let table = impute_categorical(SalesTable::new(rows), CategoricalColumn::Location);
        let locs: Vec<_> = table.rows.iter().map(|r| r.location.as_deref()).collect();
        // Tie between Takeaway and In-store goes to the first seen.
        assert_eq!(
            locs,
            vec![Some("Takeaway"), Some("Takeaway"), Some("Takeaway"), Some("In-store")]
        );
    }

    #[test]
    fn test_impute_categorical_without_values_leaves_missing() {
        let rows = vec![
            SalesRow { item: Some("UNKNOWN".to_string()), ..Default::default() },
            SalesRow { item: None, ..Default::default() },
        ];
        let table = impute_categorical(SalesTable::new(rows), CategoricalColumn::Item);
        assert_eq!(items(&table), vec![None, None]);
    }

    #[test]
    fn test_impute_categoricals_is_idempotent() {
        let rows = vec![
            SalesRow {
                item: Some("Cake".to_string()),
                payment_method: Some("ERROR".to_string()),
                location: None,
                ..Default::default()
            },
            SalesRow {
                item: Some("UNKNOWN".to_string()),
                payment_method: Some("Card".to_string()),
                location: Some("Takeaway".to_string()),
                ..Default::default()
            },
            SalesRow {
                item: Some("Tea".to_string()),
                payment_method: None,
                location: Some("UNKNOWN".to_string()),
                ..Default::default()
            },
        ];
        let once = impute_categoricals(SalesTable::new(rows));
        let twice = impute_categoricals(once.clone());
        assert_eq!(once, twice);
        for row in &once.rows {
            assert!(row.item.is_some());
            assert_eq!(row.payment_method.as_deref(), Some("Card"));
            assert_eq!(row.location.as_deref(), Some("Takeaway"));
        }
        assert_eq!(once.rows[1].item.as_deref(), Some("Cake"));
    }

    #[test]
    fn test_impute_dates_forward_fills_and_keeps_leading_gap() {
        let dates = [None, Some(date(2024, 1, 2)), None, None, Some(date(2024, 1, 10))];
        let rows = dates
            .iter()
            .map(|d| SalesRow { transaction_date: *d, ..Default::default() })
            .collect();
        let table = impute_dates(SalesTable::new(rows));
        let got: Vec<_> = table.rows.iter().map(|r| r.transaction_date).collect();
        assert_eq!(
            got,
            vec![
                None,
                Some(date(2024, 1, 2)),
                Some(date(2024, 1, 2)),
                Some(date(2024, 1, 2)),
                Some(date(2024, 1, 10)),
            ]
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&numeric(Some(1.0), Some(2.0), Some(2.0))), MissingNumeric::Complete);
        assert_eq!(classify(&numeric(None, Some(2.0), Some(2.0))), MissingNumeric::Quantity);
        assert_eq!(classify(&numeric(Some(1.0), None, Some(2.0))), MissingNumeric::PricePerUnit);
        assert_eq!(classify(&numeric(Some(1.0), Some(2.0), None)), MissingNumeric::TotalSpent);
        assert_eq!(classify(&numeric(None, None, Some(2.0))), MissingNumeric::Underdetermined);
        assert_eq!(classify(&numeric(None, None, None)), MissingNumeric::Underdetermined);
    }

    #[test]
    fn test_infer_row_quantity() {
        let row = infer_row(numeric(None, Some(2.0), Some(10.0)));
        assert_eq!(row.quantity, Some(5.0));
    }

    #[test]
    fn test_infer_row_satisfies_product() {
        for row in [
            numeric(None, Some(1.5), Some(4.5)),
            numeric(Some(4.0), None, Some(10.0)),
            numeric(Some(3.0), Some(3.0), None),
        ] {
            let row = infer_row(row);
            let (q, p, t) = (
                row.quantity.unwrap(),
                row.price_per_unit.unwrap(),
                row.total_spent.unwrap(),
            );
            assert!((q * p - t).abs() < 1e-9, "{q} * {p} != {t}");
        }
    }

    #[test]
    fn test_infer_row_leaves_two_missing_untouched() {
        let row = numeric(None, None, Some(10.0));
        assert_eq!(infer_row(row.clone()), row);
        let row = numeric(Some(1.0), Some(2.0), Some(5.0));
        assert_eq!(infer_row(row.clone()), row);
    }

    #[test]
    fn test_infer_row_zero_denominator_stays_missing() {
        let row = infer_row(numeric(None, Some(0.0), Some(10.0)));
        assert_eq!(row.quantity, None);
    }

    #[test]
    fn test_drop_nonpositive_ignores_missing() {
        let table = SalesTable::new(vec![
            numeric(Some(-3.0), Some(5.0), Some(15.0)),
            numeric(Some(2.0), Some(0.0), Some(4.0)),
            numeric(Some(2.0), Some(2.0), Some(-4.0)),
            numeric(None, Some(2.0), Some(4.0)),
            numeric(Some(1.0), Some(2.0), Some(2.0)),
        ]);
        let table = drop_nonpositive(table);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].quantity, None);
        assert_eq!(table.rows[1].quantity, Some(1.0));
    }

    #[test]
    fn test_clip_negative() {
        let table = clip_negative(SalesTable::new(vec![numeric(Some(-1.0), None, Some(2.0))]));
        assert_eq!(table.rows[0].quantity, Some(0.0));
        assert_eq!(table.rows[0].price_per_unit, None);
        assert_eq!(table.rows[0].total_spent, Some(2.0));
    }

    #[test]
    fn test_validate_numeric_drops_guesses() {
        let table = SalesTable::new(vec![
            numeric(None, Some(2.0), Some(10.0)),
            numeric(None, None, Some(10.0)),
            numeric(Some(-3.0), Some(5.0), Some(15.0)),
            numeric(Some(2.0), Some(3.0), None),
        ]);
        let table = validate_numeric(table);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].quantity, Some(5.0));
        assert_eq!(table.rows[1].total_spent, Some(6.0));
    }

    #[test]
    fn test_validate_numeric_drops_underflowed_inference() {
        let table = SalesTable::new(vec![
            numeric(None, Some(1e300), Some(1e-300)),
            numeric(Some(2.0), Some(3.0), Some(6.0)),
        ]);
        let table = validate_numeric(table);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].quantity, Some(2.0));
    }

    #[test]
    fn test_drop_incomplete_drops_zero_amounts() {
        let table = drop_incomplete(SalesTable::new(vec![
            numeric(Some(0.0), Some(3.0), Some(6.0)),
            numeric(Some(2.0), Some(3.0), Some(6.0)),
        ]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].quantity, Some(2.0));
    }

    #[test]
    fn test_clean_table_end_to_end() {
        let mut undated = full_row("Coffee", 1.0, 2.0, 2.0, 1);
        undated.transaction_date = None;
        let mut blank_item = full_row("UNKNOWN", 2.0, 1.5, 3.0, 2);
        blank_item.quantity = None;
        let mut later = full_row("Cake", 1.0, 3.0, 3.0, 3);
        later.transaction_date = None;
        let rows = vec![
            undated,
            full_row("Coffee", 2.0, 2.0, 4.0, 2),
            blank_item,
            later,
            full_row("Tea", -1.0, 1.5, 1.5, 5),
            SalesRow {
                quantity: None,
                price_per_unit: None,
                ..full_row("Juice", 1.0, 3.0, 3.0, 6)
            },
        ];
        let (records, report) = clean_table(SalesTable::new(rows));

        assert_eq!(report.input_rows, 6);
        assert_eq!(report.categorical[0].column, "Item");
        assert_eq!(report.categorical[0].sentinels, 1);
        assert_eq!(report.categorical[0].filled, 1);
        assert_eq!(report.dates_filled, 1);
        assert_eq!(report.dates_unfilled, 1);
        assert_eq!(report.dropped_nonpositive, 1);
        assert_eq!(report.inferred, 1);
        assert_eq!(report.dropped_incomplete, 1);
        assert_eq!(report.dropped_unresolved, 1);
        assert_eq!(report.clean_rows, 3);
        assert_eq!(records.len(), 3);

        assert_eq!(records[1].item, "Coffee");
        assert_eq!(records[1].quantity, 2.0);
        assert_eq!(records[2].item, "Cake");
        assert_eq!(records[2].transaction_date, date(2023, 1, 2));
        for r in &records {
            assert!(r.quantity > 0.0 && r.price_per_unit > 0.0 && r.total_spent > 0.0);
        }
    }

    #[test]
    fn test_clean_table_everything_filtered() {
        let rows = vec![
            numeric(Some(-1.0), Some(1.0), Some(1.0)),
            numeric(None, None, None),
        ];
        let (records, report) = clean_table(SalesTable::new(rows));
        assert!(records.is_empty());
        assert_eq!(report.clean_rows, 0);
        assert_eq!(report.dropped_nonpositive, 1);
        assert_eq!(report.dropped_incomplete, 1);
    }
}
