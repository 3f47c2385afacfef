// Parsing and small statistics helpers.
//
// Everything that turns a dirty CSV cell into a typed value lives here, so
// the cleaning stages can work with `Option<T>` and never see raw text.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use std::collections::HashMap;
use std::hash::Hash;

use crate::types::{NA_TOKENS, SENTINELS};

/// Parse a cell into `f64`.
///
/// - Trims surrounding whitespace.
/// - Anything `f64` cannot parse as a whole (placeholders, `1,5`) is `None`.
/// - `NaN` and infinities parse but are rejected as missing.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Dates are `YYYY-MM-DD`; placeholders never reach the parser.
    let s = s?.trim();
    if s.is_empty() || is_sentinel(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn is_sentinel(s: &str) -> bool {
    SENTINELS.contains(&s)
}

/// Trim a text cell; blank cells and NA markers become `None`. Placeholders
/// are kept verbatim, the categorical imputer decides what to do with them.
pub fn clean_text(s: Option<String>) -> Option<String> {
    let s = s?;
    let trimmed = s.trim();
    if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}

/// Most frequent value, ties going to whichever value was seen first.
pub fn mode<'a, T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut counts: HashMap<&T, (usize, usize)> = HashMap::new();
    for (idx, v) in values.into_iter().enumerate() {
        counts.entry(v).or_insert((0, idx)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then_with(|| fb.cmp(fa)))
        .map(|(v, _)| v.clone())
}

/// Distinct values in first-seen order.
pub fn distinct<'a, T, I>(values: I) -> Vec<T>
where
    T: Eq + Hash + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.clone());
        }
    }
    out
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(v: &[f64]) -> f64 {
    if v.len() < 2 {
        return 0.0;
    }
    let mean = average(v);
    let ss: f64 = v.iter().map(|x| (x - mean).powi(2)).sum();
    (ss / (v.len() - 1) as f64).sqrt()
}

/// Quantile with linear interpolation between closest ranks.
/// `sorted` must already be in ascending order.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages, e.g. `9,855 rows loaded`.
    n.to_formatted_string(&Locale::en)
}
