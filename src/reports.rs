use crate::types::{CleanRecord, ItemQuantityRow, LocationRevenueRow, MonthlySalesRow};
use chrono::Datelike;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sum `value` per `key`, then order by the sum descending. Equal sums keep
/// the keys in ascending order.
fn sum_by_desc<K, V>(data: &[CleanRecord], key: K, value: V) -> Vec<(String, f64)>
where
    K: Fn(&CleanRecord) -> &str,
    V: Fn(&CleanRecord) -> f64,
{
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for r in data {
        *map.entry(key(r)).or_insert(0.0) += value(r);
    }
    let mut rows: Vec<(String, f64)> = map.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    rows.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    rows
}

/// Which items sell the most: total quantity per item.
pub fn items_by_quantity(data: &[CleanRecord]) -> Vec<ItemQuantityRow> {
    sum_by_desc(data, |r| r.item.as_str(), |r| r.quantity)
        .into_iter()
        .map(|(item, quantity)| ItemQuantityRow { item, quantity })
        .collect()
}

/// Which locations bring in the most: total spent per location.
pub fn revenue_by_location(data: &[CleanRecord]) -> Vec<LocationRevenueRow> {
    sum_by_desc(data, |r| r.location.as_str(), |r| r.total_spent)
        .into_iter()
        .map(|(location, total_spent)| LocationRevenueRow { location, total_spent })
        .collect()
}

/// Seasonal trend: total spent per calendar month (1-12), years merged.
pub fn monthly_sales(data: &[CleanRecord]) -> Vec<MonthlySalesRow> {
    let mut map: BTreeMap<u32, f64> = BTreeMap::new();
    for r in data {
        *map.entry(r.transaction_date.month()).or_insert(0.0) += r.total_spent;
    }
    map.into_iter()
        .map(|(month, total_spent)| MonthlySalesRow { month, total_spent })
        .collect()
}
