use crate::error::{CafeError, Result};
use crate::types::{RawRow, REQUIRED_COLUMNS};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
}

/// Read the sales export into raw string rows.
///
/// Only the header is strict: each cleaned column must be present. Records
/// that fail to decode are counted and skipped, cell contents are never
/// validated here.
pub fn load_raw(path: &Path) -> Result<(Vec<RawRow>, LoadReport)> {
    let file = std::fs::File::open(path)?;
    debug!("load_raw: reading {}", path.display());
    load_raw_from_reader(file)
}

pub fn load_raw_from_reader<R: Read>(reader: R) -> Result<(Vec<RawRow>, LoadReport)> {
    // Header names are trimmed so the column check and serde agree on them.
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(CafeError::MissingColumn(col.to_string()));
        }
    }

    let mut rows = Vec::new();
    let mut report = LoadReport::default();
    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        match result {
            Ok(r) => rows.push(r),
            Err(e) => {
                warn!("load_raw: skipping record {}: {}", report.total_rows, e);
                report.parse_errors += 1;
            }
        }
    }
    debug!(
        "load_raw: {} records, {} decode errors",
        report.total_rows, report.parse_errors
    );
    Ok((rows, report))
}
