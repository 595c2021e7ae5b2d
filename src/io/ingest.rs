//! CSV ingest of the user-edited annual history (`year,value`).
//!
//! - headers are matched case-insensitively; extra columns are ignored
//! - blank rows are skipped
//! - any unparsable year or value aborts with the offending line
//! - rows are sorted by year before validation

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::domain::HistoricalSeries;
use crate::error::AppError;

const YEAR_COL: &str = "year";
const VALUE_COL: &str = "value";

pub fn load_history(path: &Path) -> Result<HistoricalSeries, AppError> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::config(path.display().to_string(), format!("failed to open history CSV: {e}")))?;
    let history = read_history(file).map_err(|e| match e {
        AppError::Configuration { message, .. } => AppError::config(path.display().to_string(), message),
        other => other,
    })?;
    info!(path = %path.display(), rows = history.values.len(), "history loaded");
    Ok(history)
}

pub fn read_history<R: Read>(reader: R) -> Result<HistoricalSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config("history", format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let year_idx = *header_map
        .get(YEAR_COL)
        .ok_or_else(|| AppError::config("history", "missing required column 'year'"))?;
    let value_idx = *header_map
        .get(VALUE_COL)
        .ok_or_else(|| AppError::config("history", "missing required column 'value'"))?;

    let mut rows: Vec<(i32, f64)> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record = record.map_err(|e| AppError::config("history", format!("line {line}: {e}")))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let year: i32 = field(year_idx)
            .parse()
            .map_err(|_| AppError::config("history", format!("line {line}: invalid year '{}'", field(year_idx))))?;
        let value: f64 = field(value_idx)
            .parse()
            .map_err(|_| AppError::config("history", format!("line {line}: invalid value '{}'", field(value_idx))))?;
        rows.push((year, value));
    }

    rows.sort_by_key(|(y, _)| *y);
    let history = HistoricalSeries {
        years: rows.iter().map(|(y, _)| *y).collect(),
        values: rows.iter().map(|(_, v)| *v).collect(),
    };
    history.validate()?;
    Ok(history)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_unsorted_rows_with_extra_columns() {
        let csv = "Year,Value,note\n2021,1.5,x\n2020,1.2,\n\n2022,1.9,y\n";
        let h = read_history(csv.as_bytes()).unwrap();
        assert_eq!(h.years, vec![2020, 2021, 2022]);
        assert_eq!(h.values, vec![1.2, 1.5, 1.9]);
    }

    #[test]
    fn bad_value_names_the_line() {
        let csv = "year,value\n2020,1.0\n2021,abc\n";
        let err = read_history(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn duplicate_years_are_rejected() {
        let csv = "year,value\n2020,1.0\n2020,2.0\n";
        assert!(matches!(read_history(csv.as_bytes()), Err(AppError::Configuration { .. })));
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_history("year,v\n2020,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'value'"));
    }
}
