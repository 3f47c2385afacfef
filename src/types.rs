use chrono::NaiveDate;
use serde::Deserialize;
use tabled::Tabled;

use crate::util::format_number;

pub const COL_TRANSACTION_ID: &str = "Transaction ID";
pub const COL_ITEM: &str = "Item";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_PRICE_PER_UNIT: &str = "Price Per Unit";
pub const COL_TOTAL_SPENT: &str = "Total Spent";
pub const COL_PAYMENT_METHOD: &str = "Payment Method";
pub const COL_LOCATION: &str = "Location";
pub const COL_TRANSACTION_DATE: &str = "Transaction Date";

/// Columns the cleaning stages read. `Transaction ID` is carried but optional.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_ITEM,
    COL_QUANTITY,
    COL_PRICE_PER_UNIT,
    COL_TOTAL_SPENT,
    COL_PAYMENT_METHOD,
    COL_LOCATION,
    COL_TRANSACTION_DATE,
];

/// All columns in file order, used for shape and missing-count reporting.
pub const ALL_COLUMNS: [&str; 8] = [
    COL_TRANSACTION_ID,
    COL_ITEM,
    COL_QUANTITY,
    COL_PRICE_PER_UNIT,
    COL_TOTAL_SPENT,
    COL_PAYMENT_METHOD,
    COL_LOCATION,
    COL_TRANSACTION_DATE,
];

/// Cell text read as "no value", the usual NA spellings of CSV exports.
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Placeholder strings the export uses in place of a real value.
pub const SENTINELS: [&str; 2] = ["UNKNOWN", "ERROR"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Transaction ID", default)]
    pub transaction_id: Option<String>,
    #[serde(rename = "Item")]
    pub item: Option<String>,
    #[serde(rename = "Quantity")]
    pub quantity: Option<String>,
    #[serde(rename = "Price Per Unit")]
    pub price_per_unit: Option<String>,
    #[serde(rename = "Total Spent")]
    pub total_spent: Option<String>,
    #[serde(rename = "Payment Method")]
    pub payment_method: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Transaction Date")]
    pub transaction_date: Option<String>,
}

/// One transaction while it moves through the cleaning stages. Every field
/// may still be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesRow {
    pub transaction_id: Option<String>,
    pub item: Option<String>,
    pub quantity: Option<f64>,
    pub price_per_unit: Option<f64>,
    pub total_spent: Option<f64>,
    pub payment_method: Option<String>,
    pub location: Option<String>,
    pub transaction_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalColumn {
    Item,
    PaymentMethod,
    Location,
}

impl CategoricalColumn {
    /// Imputation order.
    pub const ALL: [CategoricalColumn; 3] = [
        CategoricalColumn::Item,
        CategoricalColumn::PaymentMethod,
        CategoricalColumn::Location,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::Item => COL_ITEM,
            CategoricalColumn::PaymentMethod => COL_PAYMENT_METHOD,
            CategoricalColumn::Location => COL_LOCATION,
        }
    }

    pub fn get(self, row: &SalesRow) -> Option<&String> {
        match self {
            CategoricalColumn::Item => row.item.as_ref(),
            CategoricalColumn::PaymentMethod => row.payment_method.as_ref(),
            CategoricalColumn::Location => row.location.as_ref(),
        }
    }

    pub fn get_mut(self, row: &mut SalesRow) -> &mut Option<String> {
        match self {
            CategoricalColumn::Item => &mut row.item,
            CategoricalColumn::PaymentMethod => &mut row.payment_method,
            CategoricalColumn::Location => &mut row.location,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    pub rows: Vec<SalesRow>,
}

impl SalesTable {
    pub fn new(rows: Vec<SalesRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A fully cleaned transaction: nothing downstream has to handle gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub transaction_id: Option<String>,
    pub item: String,
    pub quantity: f64,
    pub price_per_unit: f64,
    pub total_spent: f64,
    pub payment_method: String,
    pub location: String,
    pub transaction_date: NaiveDate,
}

fn display_2dp(v: &f64) -> String {
    format_number(*v, 2)
}

#[derive(Debug, Tabled, Clone, PartialEq)]
pub struct ItemQuantityRow {
    #[tabled(rename = "Item")]
    pub item: String,
    #[tabled(rename = "Quantity", display_with = "display_2dp")]
    pub quantity: f64,
}

#[derive(Debug, Tabled, Clone, PartialEq)]
pub struct LocationRevenueRow {
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "Total Spent", display_with = "display_2dp")]
    pub total_spent: f64,
}

#[derive(Debug, Tabled, Clone, PartialEq)]
pub struct MonthlySalesRow {
    #[tabled(rename = "Month")]
    pub month: u32,
    #[tabled(rename = "Total Spent", display_with = "display_2dp")]
    pub total_spent: f64,
}
