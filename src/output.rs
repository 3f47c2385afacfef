use crate::cleaning::CleanReport;
use crate::profile::TableProfile;
use crate::types::{CleanRecord, RawRow};
use crate::util::{format_int, format_number};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled, Clone)]
struct PreviewRow {
    #[tabled(rename = "Transaction ID")]
    transaction_id: String,
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Price Per Unit")]
    price_per_unit: String,
    #[tabled(rename = "Total Spent")]
    total_spent: String,
    #[tabled(rename = "Payment Method")]
    payment_method: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Transaction Date")]
    transaction_date: String,
}

impl From<&RawRow> for PreviewRow {
    fn from(r: &RawRow) -> Self {
        let cell = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            transaction_id: cell(&r.transaction_id),
            item: cell(&r.item),
            quantity: cell(&r.quantity),
            price_per_unit: cell(&r.price_per_unit),
            total_spent: cell(&r.total_spent),
            payment_method: cell(&r.payment_method),
            location: cell(&r.location),
            transaction_date: cell(&r.transaction_date),
        }
    }
}

#[derive(Tabled, Clone)]
struct CleanPreviewRow {
    #[tabled(rename = "Transaction ID")]
    transaction_id: String,
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Price Per Unit")]
    price_per_unit: String,
    #[tabled(rename = "Total Spent")]
    total_spent: String,
    #[tabled(rename = "Payment Method")]
    payment_method: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Transaction Date")]
    transaction_date: String,
}

impl From<&CleanRecord> for CleanPreviewRow {
    fn from(r: &CleanRecord) -> Self {
        Self {
            transaction_id: r.transaction_id.clone().unwrap_or_default(),
            item: r.item.clone(),
            quantity: format_number(r.quantity, 2),
            price_per_unit: format_number(r.price_per_unit, 2),
            total_spent: format_number(r.total_spent, 2),
            payment_method: r.payment_method.clone(),
            location: r.location.clone(),
            transaction_date: r.transaction_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Tabled)]
struct KeyValue {
    #[tabled(rename = "Statistic")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn kv(key: impl Into<String>, value: impl Into<String>) -> KeyValue {
    KeyValue {
        key: key.into(),
        value: value.into(),
    }
}

pub fn render_table<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    Table::new(rows).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_table(slice));
}

pub fn print_head(raw: &[RawRow], max_rows: usize) {
    let rows: Vec<PreviewRow> = raw.iter().take(max_rows).map(PreviewRow::from).collect();
    preview_table_rows(&rows, max_rows);
}

pub fn print_clean_head(data: &[CleanRecord], max_rows: usize) {
    let rows: Vec<CleanPreviewRow> = data.iter().take(max_rows).map(CleanPreviewRow::from).collect();
    preview_table_rows(&rows, max_rows);
}

pub fn print_profile(profile: &TableProfile) {
    println!(
        "Shape: {} rows x {} columns",
        format_int(profile.rows as u64),
        profile.columns
    );
    println!("Duplicate rows: {}\n", format_int(profile.duplicate_rows as u64));

    println!("Missing values after type conversion:");
    println!("{}\n", render_table(profile.missing.iter().cloned()));

    for (column, values) in &profile.distinct {
        println!("{} values: {}", column, values.join(", "));
    }
    for (sentinel, n) in &profile.date_sentinels {
        println!("Transaction Date '{}' entries: {}", sentinel, format_int(*n as u64));
    }
    println!(
        "Rows with a zero or negative Quantity / Price Per Unit / Total Spent: {}\n",
        format_int(profile.nonpositive_rows as u64)
    );

    match &profile.quantity {
        Some(summary) => {
            println!("Quantity:");
            let rows = summary.rows().into_iter().map(|(k, v)| kv(k, v));
            println!("{}\n", render_table(rows));
        }
        None => println!("Quantity: no numeric values\n"),
    }
}

pub fn print_clean_report(report: &CleanReport) {
    let mut rows = vec![kv("Rows before cleaning", format_int(report.input_rows as u64))];
    for fill in &report.categorical {
        rows.push(kv(
            format!("{} placeholders", fill.column),
            format_int(fill.sentinels as u64),
        ));
        rows.push(kv(
            format!("{} filled with mode", fill.column),
            format_int(fill.filled as u64),
        ));
    }
    rows.push(kv("Dates forward-filled", format_int(report.dates_filled as u64)));
    rows.push(kv("Leading rows without a date", format_int(report.dates_unfilled as u64)));
    rows.push(kv("Dropped: non-positive amounts", format_int(report.dropped_nonpositive as u64)));
    rows.push(kv("Amounts inferred", format_int(report.inferred as u64)));
    rows.push(kv("Dropped: incomplete amounts", format_int(report.dropped_incomplete as u64)));
    rows.push(kv("Dropped: still missing a value", format_int(report.dropped_unresolved as u64)));
    rows.push(kv("Rows after cleaning", format_int(report.clean_rows as u64)));
    println!("{}\n", render_table(rows));
}
