//! History CSV ingest and normalization.
//!
//! This module turns a heterogeneous price-history CSV into a clean
//! `HistoryData` table that is safe to serialize into a forecast request.
//!
//! Design goals:
//! - **Strict schema** for the required `Date` column (clear errors)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Read-only**: the file is read once per session, never written

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use log::debug;

use crate::domain::{HistoricalRecord, HistoryData, HistoryStats};
use crate::error::{AppError, ErrorKind};

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the normalized table plus per-row problems.
#[derive(Debug, Clone)]
pub struct IngestedHistory {
    pub data: HistoryData,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load and normalize a history CSV.
pub fn load_history(path: &Path) -> Result<IngestedHistory, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            ErrorKind::Config,
            format!("Failed to open history CSV '{}': {e}", path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| {
            AppError::new(
                ErrorKind::MalformedInput,
                format!("Failed to read CSV headers: {e}"),
            )
        })?
        .clone();

    let schema = resolve_schema(&headers)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &schema) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if records.is_empty() {
        return Err(AppError::new(
            ErrorKind::MalformedInput,
            format!(
                "No usable rows in '{}' ({} row error(s)).",
                path.display(),
                row_errors.len()
            ),
        ));
    }

    debug!(
        "loaded {} of {rows_read} history rows from {}",
        records.len(),
        path.display()
    );

    let stats = compute_stats(&records);

    Ok(IngestedHistory {
        data: HistoryData {
            columns: schema.price_columns.iter().map(|(_, name)| name.clone()).collect(),
            records,
            stats,
        },
        row_errors,
        rows_read,
    })
}

struct Schema {
    date_idx: usize,
    /// (record index, original header name) per numeric price column.
    price_columns: Vec<(usize, String)>,
}

fn resolve_schema(headers: &StringRecord) -> Result<Schema, AppError> {
    let header_map = build_header_map(headers);

    let date_idx = *header_map.get("date").ok_or_else(|| {
        AppError::new(
            ErrorKind::MalformedInput,
            "History CSV is missing a 'Date' column.",
        )
    })?;

    let mut price_columns = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        if idx == date_idx {
            continue;
        }
        let name = name.trim().trim_start_matches('\u{feff}');
        if name.is_empty() {
            continue;
        }
        price_columns.push((idx, name.to_string()));
    }

    if price_columns.is_empty() {
        return Err(AppError::new(
            ErrorKind::MalformedInput,
            "History CSV has no price columns besides 'Date'.",
        ));
    }

    Ok(Schema {
        date_idx,
        price_columns,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿Date"). If we don't strip it, schema validation
    // will incorrectly report a missing Date column.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, schema: &Schema) -> Result<HistoricalRecord, String> {
    let raw_date = record
        .get(schema.date_idx)
        .ok_or_else(|| "Row is missing the Date field.".to_string())?;
    let date = parse_date(raw_date)?;

    let mut values = Vec::with_capacity(schema.price_columns.len());
    for (idx, name) in &schema.price_columns {
        let raw = record.get(*idx).unwrap_or("");
        let value = raw
            .parse::<f64>()
            .map_err(|_| format!("Column '{name}' has a non-numeric value '{raw}'."))?;
        if !value.is_finite() {
            return Err(format!("Column '{name}' has a non-finite value."));
        }
        values.push(value);
    }

    Ok(HistoricalRecord { date, values })
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(date);
        }
    }
    Err(format!("Unrecognized date '{raw}'."))
}

fn compute_stats(records: &[HistoricalRecord]) -> HistoryStats {
    let mut first = records[0].date;
    let mut last = records[0].date;
    for r in records {
        first = first.min(r.date);
        last = last.max(r.date);
    }
    HistoryStats {
        n_rows: records.len(),
        first_date: first,
        last_date: last,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("stockcast-history-{name}.csv"));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_a_well_formed_history() {
        let path = write_temp_csv(
            "ok",
            "Date,Open,Close\n2024-07-01,100.0,101.5\n2024-07-02,101.5,99.75\n",
        );
        let ingested = load_history(&path).unwrap();

        assert_eq!(ingested.data.columns, vec!["Open", "Close"]);
        assert_eq!(ingested.data.records.len(), 2);
        assert_eq!(ingested.data.records[1].values, vec![101.5, 99.75]);
        assert_eq!(
            ingested.data.stats.first_date,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
        );
        assert!(ingested.row_errors.is_empty());
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let path = write_temp_csv("nodate", "Open,Close\n100.0,101.5\n");
        let err = load_history(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("Date"));
    }

    #[test]
    fn bad_rows_are_collected_not_fatal() {
        let path = write_temp_csv(
            "mixed",
            "Date,Close\n2024-07-01,100.0\nnot-a-date,101.0\n2024-07-03,oops\n2024-07-04,102.5\n",
        );
        let ingested = load_history(&path).unwrap();

        assert_eq!(ingested.rows_read, 4);
        assert_eq!(ingested.data.records.len(), 2);
        assert_eq!(ingested.row_errors.len(), 2);
        assert_eq!(ingested.row_errors[0].line, 3);
    }

    #[test]
    fn bom_prefixed_date_header_is_accepted() {
        let path = write_temp_csv("bom", "\u{feff}Date,Close\n2024-07-01,100.0\n");
        let ingested = load_history(&path).unwrap();
        assert_eq!(ingested.data.records.len(), 1);
    }

    #[test]
    fn all_rows_bad_is_an_error() {
        let path = write_temp_csv("allbad", "Date,Close\nnope,100.0\n");
        let err = load_history(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }
}
